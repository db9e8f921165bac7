// DeployScribe - core/export.rs
//
// CSV and JSON renderings of deployment records for downstream tooling.
// Core layer: writes to any Write trait object.

use crate::core::model::{DeploymentRecord, ExtractedObject};
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

const CSV_HEADER: [&str; 9] = [
    "subject",
    "timestamp",
    "package_id",
    "tx_digest",
    "object_id",
    "object_type",
    "short_type",
    "owner",
    "owner_address",
];

/// Export records to CSV, one row per object.
///
/// A record with no objects still gets one row with empty object columns,
/// so every record is represented. Returns the number of rows written.
pub fn export_csv<W: Write>(
    records: &[DeploymentRecord],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let csv_err = |e| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADER).map_err(csv_err)?;

    let mut rows = 0;
    for record in records {
        let timestamp = record.timestamp.format("%Y-%m-%d").to_string();
        let prefix = [
            record.subject_name.as_str(),
            timestamp.as_str(),
            record.package_id.as_str(),
            record.tx_digest.as_str(),
        ];

        if record.objects.is_empty() {
            csv_writer
                .write_record(prefix.iter().copied().chain([""; 5]))
                .map_err(csv_err)?;
            rows += 1;
            continue;
        }

        for obj in &record.objects {
            csv_writer
                .write_record(prefix.iter().copied().chain(object_columns(obj)))
                .map_err(csv_err)?;
            rows += 1;
        }
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(rows)
}

fn object_columns(obj: &ExtractedObject) -> [&str; 5] {
    [
        obj.object_id.as_str(),
        obj.object_type.as_str(),
        obj.short_type.as_str(),
        obj.owner_kind.label(),
        obj.owner_address.as_str(),
    ]
}

/// Export records as a pretty-printed JSON array. Returns the record count.
pub fn export_json<W: Write>(
    records: &[DeploymentRecord],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(writer, records).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    Ok(records.len())
}
