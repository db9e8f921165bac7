// DeployScribe - platform/sink.rs
//
// Destinations for the rendered report.

use crate::util::error::ExportError;
use std::path::{Path, PathBuf};

/// Accepts the final report text.
pub trait ReportSink {
    fn write_report(&mut self, text: &str) -> Result<(), ExportError>;

    /// Where the report ends up, if it is a file.
    fn location(&self) -> Option<&Path> {
        None
    }
}

/// Writes the report as UTF-8 to a fixed path, replacing any previous
/// content and creating missing parent directories.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSink for FileSink {
    fn write_report(&mut self, text: &str) -> Result<(), ExportError> {
        let io_err = |e| ExportError::Io {
            path: self.path.clone(),
            source: e,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(&self.path, text).map_err(io_err)?;
        tracing::info!(path = %self.path.display(), bytes = text.len(), "Report written");
        Ok(())
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// Collects reports in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub reports: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent report, if any was written.
    pub fn last(&self) -> Option<&str> {
        self.reports.last().map(String::as_str)
    }
}

impl ReportSink for MemorySink {
    fn write_report(&mut self, text: &str) -> Result<(), ExportError> {
        self.reports.push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_sink_creates_parents_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.md");
        let mut sink = FileSink::new(&path);

        sink.write_report("first").unwrap();
        sink.write_report("second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        assert_eq!(sink.location(), Some(path.as_path()));
    }

    #[test]
    fn test_memory_sink_collects() {
        let mut sink = MemorySink::new();
        assert!(sink.last().is_none());
        sink.write_report("# Report").unwrap();
        assert_eq!(sink.last(), Some("# Report"));
        assert!(sink.location().is_none());
    }
}
