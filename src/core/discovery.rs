// DeployScribe - core/discovery.rs
//
// Locates deployment logs under a directory.
//
// Uses `walkdir` for traversal and `glob` for file-name filters. Reads only
// directory entries, never file contents; reading is owned by the app layer.
//
// Per-entry I/O errors are non-fatal and collected as warnings. Only an
// unusable root is an error.

use crate::core::model::LogSource;
use crate::util::constants;
use crate::util::error::DiscoveryError;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for a discovery operation.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Maximum directory recursion depth. 1 = files directly in the root.
    pub max_depth: usize,

    /// Maximum number of sources returned. Extra files are dropped with a
    /// warning.
    pub max_files: usize,

    /// Glob (file name only) a log must match.
    pub include_pattern: String,

    /// Globs matched against file names; matching files are skipped.
    pub exclude_patterns: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_depth: constants::DEFAULT_MAX_DEPTH,
            max_files: constants::DEFAULT_MAX_FILES,
            include_pattern: constants::DEFAULT_INCLUDE_PATTERN.to_string(),
            exclude_patterns: constants::DEFAULT_EXCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

// =============================================================================
// File name convention
// =============================================================================

fn log_file_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\w+)_deploy_\d{4}-\d{2}-\d{2}\.log$")
            .expect("discovery: invalid log file name regex")
    })
}

/// Subject named by a `<Subject>_deploy_<YYYY-MM-DD>.log` file name.
pub fn subject_from_file_name(file_name: &str) -> Option<String> {
    log_file_name_regex()
        .captures(file_name)
        .map(|caps| caps[1].to_string())
}

// =============================================================================
// Discovery
// =============================================================================

/// Discover deployment logs under `root`.
///
/// Returns sources sorted by file name plus non-fatal warnings. Files that
/// pass the include glob but do not follow the naming convention are skipped
/// with a debug event.
///
/// # Errors
/// Only for an unusable root (`RootNotFound`, `NotADirectory`,
/// `PermissionDenied`).
pub fn discover_sources(
    root: &Path,
    config: &DiscoveryConfig,
) -> Result<(Vec<LogSource>, Vec<String>), DiscoveryError> {
    // fs::metadata rather than Path::is_dir so access-denied is not reported
    // as a missing directory.
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(DiscoveryError::NotADirectory {
                path: root.to_path_buf(),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(DiscoveryError::PermissionDenied {
                path: root.to_path_buf(),
                source: e,
            })
        }
        Err(_) => {
            return Err(DiscoveryError::RootNotFound {
                path: root.to_path_buf(),
            })
        }
    }

    let max_files = config
        .max_files
        .clamp(constants::MIN_MAX_FILES, constants::ABSOLUTE_MAX_FILES);
    let max_depth = config.max_depth.min(constants::ABSOLUTE_MAX_DEPTH);

    tracing::debug!(
        root = %root.display(),
        max_depth,
        max_files,
        include = %config.include_pattern,
        exclude = ?config.exclude_patterns,
        "Discovery starting"
    );

    let include_pats = compile_patterns(std::slice::from_ref(&config.include_pattern), "include");
    let exclude_pats = compile_patterns(&config.exclude_patterns, "exclude");

    let mut sources: Vec<LogSource> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    let walker = walkdir::WalkDir::new(root)
        .max_depth(max_depth)
        .follow_links(false);

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                let path_str = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                let msg = format!("Cannot access '{path_str}': {e}");
                tracing::debug!(warning = %msg, "Discovery warning");
                warnings.push(msg);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => {
                warnings.push(format!("Skipping '{}': non-UTF-8 filename", path.display()));
                continue;
            }
        };

        if exclude_pats.iter().any(|p| p.matches(file_name)) {
            tracing::trace!(file = file_name, "Excluded by pattern");
            continue;
        }
        if !is_included(file_name, &include_pats) {
            tracing::trace!(file = file_name, "Not matched by include pattern");
            continue;
        }

        let Some(subject_name) = subject_from_file_name(file_name) else {
            tracing::debug!(file = file_name, "Skipped: not a <Subject>_deploy_<date>.log name");
            continue;
        };

        sources.push(LogSource {
            path: path.to_path_buf(),
            file_name: file_name.to_string(),
            subject_name,
        });
    }

    sources.sort_by(|a, b| a.file_name.cmp(&b.file_name).then_with(|| a.path.cmp(&b.path)));

    let total_found = sources.len();
    if total_found > max_files {
        sources.truncate(max_files);
        warnings.push(format!(
            "{total_found} deployment logs were found but the limit is {max_files}. \
             Only the first {max_files} by file name are processed."
        ));
        tracing::info!(total_found, limit = max_files, "Source list truncated");
    }

    tracing::debug!(
        total_found,
        sources = sources.len(),
        warnings = warnings.len(),
        "Discovery complete"
    );

    Ok((sources, warnings))
}

// =============================================================================
// Glob helpers
// =============================================================================

/// Compile glob strings; patterns that fail to compile are logged and skipped.
fn compile_patterns(patterns: &[String], kind: &str) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter(|p| !p.trim().is_empty())
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(compiled) => Some(compiled),
            Err(e) => {
                tracing::warn!(pattern = p, kind, error = %e, "Invalid glob pattern, skipping");
                None
            }
        })
        .collect()
}

/// An empty include list means "include all".
fn is_included(file_name: &str, include_pats: &[glob::Pattern]) -> bool {
    include_pats.is_empty() || include_pats.iter().any(|p| p.matches(file_name))
}

// =============================================================================
// Tests
// =============================================================================
