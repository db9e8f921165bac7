// DeployScribe - app/pipeline.rs
//
// One run: discover logs, extract a record from each, render, hand the
// result to a sink.
//
// Per-source failures (unreadable file, invalid encoding, oversized log)
// degrade that source's record and the batch continues. Only finding no
// sources at all, or failing to write the output, stops the run.

use crate::core::discovery::{self, DiscoveryConfig};
use crate::core::export;
use crate::core::extractor::{ExtractConfig, Extractor};
use crate::core::model::{DeploymentRecord, LogSource, OutputFormat, RunSummary};
use crate::core::patterns::PatternTable;
use crate::core::report::{ReportConfig, Reporter};
use crate::platform::config::AppConfig;
use crate::platform::fs;
use crate::platform::sink::ReportSink;
use crate::util::error::{DeployScribeError, Result};
use std::path::{Path, PathBuf};

/// Everything a run needs besides the pattern table and the sink.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub log_dir: PathBuf,
    pub discovery: DiscoveryConfig,
    pub extract: ExtractConfig,
    pub report: ReportConfig,
    pub format: OutputFormat,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::from_app_config(&AppConfig::default())
    }
}

impl RunConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            log_dir: config.log_dir.clone(),
            discovery: DiscoveryConfig {
                max_depth: config.max_depth,
                max_files: config.max_files,
                include_pattern: config.include_pattern.clone(),
                ..DiscoveryConfig::default()
            },
            extract: ExtractConfig {
                max_log_bytes: config.max_log_bytes,
                context_window_chars: config.context_window_chars,
            },
            report: ReportConfig {
                title: config.title.clone(),
                network_label: config.network_label.clone(),
                explorer_url: config.explorer_url.clone(),
                subject_order: config.subject_order.clone(),
            },
            format: config.format,
        }
    }
}

/// Execute a full run.
///
/// # Errors
/// `NoSourcesFound` when discovery yields nothing (the sink is not touched),
/// `Discovery` for an unusable log directory, `Export` when rendering or
/// writing the output fails.
pub fn run(config: &RunConfig, table: &PatternTable, sink: &mut dyn ReportSink) -> Result<RunSummary> {
    tracing::info!(
        log_dir = %config.log_dir.display(),
        table = %table.id,
        format = ?config.format,
        "Run started"
    );

    let (sources, warnings) = discovery::discover_sources(&config.log_dir, &config.discovery)?;
    for warning in &warnings {
        tracing::warn!(warning = %warning, "Discovery warning");
    }

    if sources.is_empty() {
        return Err(DeployScribeError::NoSourcesFound {
            root: config.log_dir.clone(),
            pattern: config.discovery.include_pattern.clone(),
        });
    }
    tracing::info!(count = sources.len(), "Deployment logs found");

    let extractor = Extractor::new(table.clone(), config.extract.clone());
    let records: Vec<DeploymentRecord> = sources
        .iter()
        .map(|source| process_source(&extractor, source, config.extract.max_log_bytes))
        .collect();

    let text = render(&records, config, sink.location())?;
    sink.write_report(&text)?;

    let degraded = records.iter().filter(|r| r.is_parse_error()).count();
    let summary = RunSummary {
        sources: sources.len(),
        parsed: records.len() - degraded,
        degraded,
        total_objects: records.iter().map(|r| r.objects.len()).sum(),
        warnings,
        output: sink.location().map(Path::to_path_buf),
    };

    tracing::info!(
        sources = summary.sources,
        parsed = summary.parsed,
        degraded = summary.degraded,
        objects = summary.total_objects,
        "Run complete"
    );

    Ok(summary)
}

fn process_source(extractor: &Extractor, source: &LogSource, max_bytes: usize) -> DeploymentRecord {
    tracing::info!(
        subject = %source.subject_name,
        file = %source.file_name,
        "Processing deployment log"
    );

    let record = match fs::read_bytes(&source.path, max_bytes) {
        Ok(raw) => extractor.extract_bytes(&raw, &source.subject_name, &source.file_name),
        Err(e) => {
            tracing::warn!(
                file = %source.path.display(),
                error = %e,
                "Could not read deployment log"
            );
            DeploymentRecord::parse_error(
                source.subject_name.clone(),
                chrono::Local::now().date_naive(),
            )
        }
    };

    tracing::debug!(
        subject = %record.subject_name,
        package_id = %record.package_id,
        tx_digest = %record.tx_digest,
        objects = record.objects.len(),
        "Record extracted"
    );
    record
}

/// Render `records` in the configured format.
pub fn render(records: &[DeploymentRecord], config: &RunConfig, destination: Option<&Path>) -> Result<String> {
    let path = destination.unwrap_or_else(|| Path::new("<memory>"));
    let text = match config.format {
        OutputFormat::Markdown => Reporter::new(config.report.clone()).render(records),
        OutputFormat::Json => {
            let mut buf = Vec::new();
            export::export_json(records, &mut buf, path)?;
            String::from_utf8_lossy(&buf).into_owned()
        }
        OutputFormat::Csv => {
            let mut buf = Vec::new();
            export::export_csv(records, &mut buf, path)?;
            String::from_utf8_lossy(&buf).into_owned()
        }
    };
    Ok(text)
}
