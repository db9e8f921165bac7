// DeployScribe - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.
// Every resource bound used by discovery, extraction, and rendering lives
// here so the limits are auditable in one place.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "DeployScribe";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "DeployScribe";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Discovery limits
// =============================================================================

/// Default directory recursion depth. 1 = files directly inside the log dir.
pub const DEFAULT_MAX_DEPTH: usize = 1;

/// Hard upper bound on max depth (prevents runaway traversal).
pub const ABSOLUTE_MAX_DEPTH: usize = 50;

/// Minimum sensible value for the max-files limit.
pub const MIN_MAX_FILES: usize = 1;

/// Maximum number of log sources processed in a single run.
pub const DEFAULT_MAX_FILES: usize = 500;

/// Hard upper bound on max files (prevents configuration mistakes).
pub const ABSOLUTE_MAX_FILES: usize = 10_000;

/// Default directory scanned for deployment logs.
pub const DEFAULT_LOG_DIR: &str = "deploy_logs";

/// Default include glob for deployment log files.
pub const DEFAULT_INCLUDE_PATTERN: &str = "*_deploy_*.log";

/// Default exclude glob patterns for deployment log discovery.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &["*.gz", "*.bak", "*.tmp"];

// =============================================================================
// Extraction limits
// =============================================================================

/// Maximum size of a single deployment log in bytes. Larger inputs degrade
/// to a parse-error record instead of being scanned.
pub const DEFAULT_MAX_LOG_BYTES: usize = 16 * 1024 * 1024; // 16 MiB

/// Lower bound for the configurable log size cap.
pub const MIN_MAX_LOG_BYTES: usize = 1024;

/// Upper bound for the configurable log size cap.
pub const ABSOLUTE_MAX_LOG_BYTES: usize = 256 * 1024 * 1024; // 256 MiB

/// Characters taken on each side of an `Object ID:` hit by the full-text scan.
pub const DEFAULT_CONTEXT_WINDOW_CHARS: usize = 200;

/// Bounds for the configurable context window.
pub const MIN_CONTEXT_WINDOW_CHARS: usize = 16;
pub const MAX_CONTEXT_WINDOW_CHARS: usize = 4_096;

/// Number of line segments before an `Object ID:` hit inspected when
/// classifying objects inside an embedded `resources="..."` blob.
pub const SCRIPT_CONTEXT_LINES: usize = 3;

/// Sentinel for a field that no pattern matched.
pub const SENTINEL_UNKNOWN: &str = "unknown";

/// Sentinel for a field whose source failed to parse.
pub const SENTINEL_PARSE_ERROR: &str = "parse-error";

/// Maximum length of a log excerpt included in debug output.
pub const DEBUG_MAX_PREVIEW: usize = 200;

// =============================================================================
// Pattern table limits
// =============================================================================

/// Maximum regex pattern length to prevent ReDoS.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4_096;

/// Maximum size of a pattern table TOML file in bytes.
pub const MAX_PATTERN_FILE_SIZE: u64 = 256 * 1024; // 256 KB

/// Maximum number of subjects in one pattern table.
pub const MAX_SUBJECTS: usize = 100;

// =============================================================================
// Report defaults
// =============================================================================

/// Default destination of the rendered report.
pub const DEFAULT_OUTPUT_PATH: &str = "contract_deploy_newest.md";

/// Default report document title.
pub const DEFAULT_REPORT_TITLE: &str = "Latest Contract Deployments";

/// Default network label printed for every record.
pub const DEFAULT_NETWORK_LABEL: &str = "Sui Testnet";

/// Placeholder substituted with the transaction digest in the explorer URL.
pub const DIGEST_PLACEHOLDER: &str = "{digest}";

/// Default explorer URL template.
pub const DEFAULT_EXPLORER_URL: &str = "https://suiexplorer.com/txblock/{digest}";

/// Default subject ordering in the report (rank = position + 1).
pub const DEFAULT_SUBJECT_ORDER: &[&str] = &["Coin", "Fund", "Insurance", "Bond", "Pool"];

/// Rank given to subjects not present in the ordering.
pub const UNRANKED_SUBJECT: usize = 99;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
