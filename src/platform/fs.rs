// DeployScribe - platform/fs.rs
//
// Filesystem reads for log sources.

use crate::util::error::ParseError;
use std::path::Path;

/// Read a log file as raw bytes, refusing files over `max_bytes`.
///
/// Decoding is left to the extractor so invalid UTF-8 degrades the record
/// instead of being replaced lossily here.
pub fn read_bytes(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ParseError> {
    let io_err = |e| ParseError::Io {
        file: path.to_path_buf(),
        source: e,
    };

    let size = std::fs::metadata(path).map_err(io_err)?.len();
    if size > max_bytes as u64 {
        return Err(ParseError::LogTooLarge {
            source_name: path.display().to_string(),
            size: usize::try_from(size).unwrap_or(usize::MAX),
            max_size: max_bytes,
        });
    }

    std::fs::read(path).map_err(io_err)
}
