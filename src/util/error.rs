// DeployScribe - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation between layers.
// All errors preserve the causal chain for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all DeployScribe operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum DeployScribeError {
    /// Pattern table loading or validation failed.
    Pattern(PatternError),

    /// Log source discovery failed.
    Discovery(DiscoveryError),

    /// A deployment log could not be parsed.
    Parse(ParseError),

    /// Writing the report or an export failed.
    Export(ExportError),

    /// Configuration loading failed.
    Config(ConfigError),

    /// Discovery completed but found no deployment logs at all.
    /// This is the only condition that stops a run without producing a report.
    NoSourcesFound { root: PathBuf, pattern: String },
}

impl fmt::Display for DeployScribeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pattern(e) => write!(f, "Pattern table error: {e}"),
            Self::Discovery(e) => write!(f, "Discovery error: {e}"),
            Self::Parse(e) => write!(f, "Parse error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::NoSourcesFound { root, pattern } => write!(
                f,
                "No deployment logs matching '{pattern}' found in '{}'; no report written",
                root.display()
            ),
        }
    }
}

impl std::error::Error for DeployScribeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pattern(e) => Some(e),
            Self::Discovery(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::NoSourcesFound { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Pattern table errors
// ---------------------------------------------------------------------------

/// Errors related to pattern table loading and validation.
#[derive(Debug)]
pub enum PatternError {
    /// TOML file could not be parsed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Pattern file exceeds the maximum allowed size.
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// A required field is missing or empty.
    MissingField { table_id: String, field: String },

    /// A regex pattern in the table is invalid.
    InvalidRegex {
        table_id: String,
        field: String,
        pattern: String,
        source: regex::Error,
    },

    /// A regex pattern exceeds the maximum allowed length.
    RegexTooLong {
        table_id: String,
        field: String,
        length: usize,
        max_length: usize,
    },

    /// A rule's regex has fewer capture groups than its owner kind needs.
    MissingCaptureGroup {
        table_id: String,
        field: String,
        required: usize,
        found: usize,
    },

    /// A rule names an owner kind other than Immutable, Shared, or Account.
    InvalidOwner {
        table_id: String,
        subject: String,
        value: String,
    },

    /// Two subjects in the same table share a name.
    DuplicateSubject { table_id: String, name: String },

    /// The table declares more subjects than allowed.
    TooManySubjects { count: usize, max: usize },

    /// I/O error reading a pattern file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Failed to parse TOML '{}': {source}", path.display())
            }
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "Pattern file '{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
            Self::MissingField { table_id, field } => {
                write!(f, "Table '{table_id}': missing required field '{field}'")
            }
            Self::InvalidRegex {
                table_id,
                field,
                pattern,
                source,
            } => write!(
                f,
                "Table '{table_id}': invalid regex in '{field}' ('{pattern}'): {source}"
            ),
            Self::RegexTooLong {
                table_id,
                field,
                length,
                max_length,
            } => write!(
                f,
                "Table '{table_id}': regex in '{field}' is {length} chars, \
                 exceeds maximum of {max_length}"
            ),
            Self::MissingCaptureGroup {
                table_id,
                field,
                required,
                found,
            } => write!(
                f,
                "Table '{table_id}': regex in '{field}' has {found} capture group(s), \
                 needs at least {required}"
            ),
            Self::InvalidOwner {
                table_id,
                subject,
                value,
            } => write!(
                f,
                "Table '{table_id}': subject '{subject}' uses owner '{value}'. \
                 Expected Immutable, Shared, or Account"
            ),
            Self::DuplicateSubject { table_id, name } => {
                write!(f, "Table '{table_id}': duplicate subject '{name}'")
            }
            Self::TooManySubjects { count, max } => {
                write!(f, "Too many subjects in pattern table ({count}), maximum is {max}")
            }
            Self::Io { path, source } => {
                write!(
                    f,
                    "I/O error reading pattern file '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for PatternError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::InvalidRegex { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<PatternError> for DeployScribeError {
    fn from(e: PatternError) -> Self {
        Self::Pattern(e)
    }
}

// ---------------------------------------------------------------------------
// Discovery errors
// ---------------------------------------------------------------------------

/// Errors related to log source discovery.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The log directory does not exist or is not accessible.
    RootNotFound { path: PathBuf },

    /// The log directory path is not a directory.
    NotADirectory { path: PathBuf },

    /// Permission denied accessing the log directory.
    PermissionDenied { path: PathBuf, source: io::Error },
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { path } => {
                write!(f, "Log directory '{}' does not exist", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Log path '{}' is not a directory", path.display())
            }
            Self::PermissionDenied { path, source } => {
                write!(
                    f,
                    "Permission denied accessing '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PermissionDenied { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DiscoveryError> for DeployScribeError {
    fn from(e: DiscoveryError) -> Self {
        Self::Discovery(e)
    }
}

// ---------------------------------------------------------------------------
// Parse errors
// ---------------------------------------------------------------------------

/// Errors that degrade a single deployment record to its parse-error shape.
///
/// These never abort a batch: the extractor collapses them into sentinel
/// values at its boundary.
#[derive(Debug)]
pub enum ParseError {
    /// Log bytes are not valid UTF-8.
    InvalidEncoding {
        source_name: String,
        source: std::str::Utf8Error,
    },

    /// Log exceeds the configured size cap.
    LogTooLarge {
        source_name: String,
        size: usize,
        max_size: usize,
    },

    /// I/O error while reading a log file.
    Io { file: PathBuf, source: io::Error },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEncoding {
                source_name,
                source,
            } => write!(f, "'{source_name}': invalid UTF-8 encoding: {source}"),
            Self::LogTooLarge {
                source_name,
                size,
                max_size,
            } => write!(
                f,
                "'{source_name}': log is {size} bytes, exceeds maximum of {max_size} bytes"
            ),
            Self::Io { file, source } => {
                write!(f, "'{}': I/O error: {source}", file.display())
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidEncoding { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            Self::LogTooLarge { .. } => None,
        }
    }
}

impl From<ParseError> for DeployScribeError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to writing the report or an export.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the output file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for DeployScribeError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to loading an explicitly requested configuration file.
///
/// Problems with the implicit platform config file are reported as warnings
/// instead, so a broken default config never blocks a run.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for DeployScribeError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for DeployScribe results.
pub type Result<T> = std::result::Result<T, DeployScribeError>;
