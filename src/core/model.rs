// DeployScribe - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.
//
// These types are the shared vocabulary across all layers.

use crate::util::constants;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::PathBuf;
use std::str::FromStr;

// =============================================================================
// Ownership
// =============================================================================

/// Who owns an on-chain object, as far as the log text tells us.
///
/// `Unknown` carries the raw owner label found in the log (for example
/// `"Addressowner"` or `"ObjectOwner"`) so the report can echo it verbatim.
/// An owner with no label at all is `Unknown("Unknown")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OwnerKind {
    Immutable,
    Shared,
    Account,
    Unknown(String),
}

impl OwnerKind {
    /// The unlabeled unknown owner.
    pub fn unknown() -> Self {
        OwnerKind::Unknown("Unknown".to_string())
    }

    /// Map an owner keyword (case-insensitive) to a kind.
    /// Unrecognised keywords are kept as `Unknown(raw)`.
    pub fn from_keyword(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "immutable" => OwnerKind::Immutable,
            "shared" => OwnerKind::Shared,
            "account" => OwnerKind::Account,
            "" | "unknown" => OwnerKind::unknown(),
            _ => OwnerKind::Unknown(raw.trim().to_string()),
        }
    }

    /// Strict parse used by pattern tables: only the three definite kinds.
    pub fn parse_definite(raw: &str) -> Option<Self> {
        match OwnerKind::from_keyword(raw) {
            OwnerKind::Unknown(_) => None,
            kind => Some(kind),
        }
    }

    /// Human-readable label (the raw label for unknown owners).
    pub fn label(&self) -> &str {
        match self {
            OwnerKind::Immutable => "Immutable",
            OwnerKind::Shared => "Shared",
            OwnerKind::Account => "Account",
            OwnerKind::Unknown(raw) => raw,
        }
    }
}

impl Default for OwnerKind {
    fn default() -> Self {
        OwnerKind::unknown()
    }
}

impl std::fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for OwnerKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for OwnerKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(OwnerKind::from_keyword(&raw))
    }
}

// =============================================================================
// Extracted object
// =============================================================================

/// One on-chain artifact recovered from a deployment log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedObject {
    /// Hex object identifier (`0x...`).
    pub object_id: String,

    /// Fully-qualified type, e.g. `coin::TreasuryCap` or `0x2::coin::CoinMetadata`.
    pub object_type: String,

    /// Display label used to group objects in the report.
    pub short_type: String,

    pub owner_kind: OwnerKind,

    /// Owner address; non-empty only for `OwnerKind::Account`.
    pub owner_address: String,
}

impl ExtractedObject {
    /// Build an object, dropping any address that does not belong to an
    /// account owner.
    pub fn new(
        object_id: impl Into<String>,
        object_type: impl Into<String>,
        short_type: impl Into<String>,
        owner_kind: OwnerKind,
        owner_address: impl Into<String>,
    ) -> Self {
        let owner_address = if owner_kind == OwnerKind::Account {
            owner_address.into()
        } else {
            String::new()
        };
        Self {
            object_id: object_id.into(),
            object_type: object_type.into(),
            short_type: short_type.into(),
            owner_kind,
            owner_address,
        }
    }
}

// =============================================================================
// Deployment record
// =============================================================================

/// Everything recovered from one deployment log.
///
/// `package_id` and `tx_digest` always hold either a real value or one of the
/// sentinels `"unknown"` / `"parse-error"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub subject_name: String,
    pub package_id: String,
    pub tx_digest: String,
    /// Discovery order. May be empty.
    pub objects: Vec<ExtractedObject>,
    pub timestamp: NaiveDate,
}

impl DeploymentRecord {
    /// The all-sentinel record produced when a source fails to parse.
    pub fn parse_error(subject_name: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            subject_name: subject_name.into(),
            package_id: constants::SENTINEL_PARSE_ERROR.to_string(),
            tx_digest: constants::SENTINEL_PARSE_ERROR.to_string(),
            objects: Vec::new(),
            timestamp: today,
        }
    }

    /// True if this record is the degraded parse-error shape.
    pub fn is_parse_error(&self) -> bool {
        self.package_id == constants::SENTINEL_PARSE_ERROR
            && self.tx_digest == constants::SENTINEL_PARSE_ERROR
    }
}

// =============================================================================
// Log source (output of discovery)
// =============================================================================

/// A deployment log found on disk, before it is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSource {
    /// Full path to the log file.
    pub path: PathBuf,

    /// File name only; used for timestamp derivation.
    pub file_name: String,

    /// Subject derived from the `<Subject>_deploy_<date>.log` convention.
    pub subject_name: String,
}

// =============================================================================
// Output format
// =============================================================================

/// Rendering of the final artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable markdown report.
    #[default]
    Markdown,
    /// Pretty-printed JSON array of records.
    Json,
    /// One CSV row per object.
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!(
                "unknown output format '{other}' (expected markdown, json, or csv)"
            )),
        }
    }
}

// =============================================================================
// Run summary
// =============================================================================

/// Summary statistics for a completed run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Log sources discovered.
    pub sources: usize,

    /// Records that parsed without degrading.
    pub parsed: usize,

    /// Records degraded to the parse-error shape.
    pub degraded: usize,

    /// Objects across all records.
    pub total_objects: usize,

    /// Non-fatal discovery warnings.
    pub warnings: Vec<String>,

    /// Where the output was written.
    pub output: Option<PathBuf>,
}
