// DeployScribe - core/patterns.rs
//
// Pattern table loading and validation.
// Core layer: accepts TOML strings, never touches the filesystem.
// I/O is handled by app::pattern_mgr which feeds content here.
//
// A pattern table holds the content-coupled half of extraction: per-subject
// object rules, type keywords for the heuristic strategies, the upgrade
// capability rule, and the localized labels some log variants use. The
// structural regexes that do not vary between projects live in the extractor.

use crate::core::model::OwnerKind;
use crate::util::constants;
use crate::util::error::PatternError;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

// =============================================================================
// TOML deserialization structures (raw input)
// =============================================================================

/// Raw TOML pattern table as deserialized from a .toml file.
/// This is validated and compiled into a `PatternTable` for runtime use.
#[derive(Debug, Deserialize)]
pub struct PatternDefinition {
    pub table: TableMeta,
    #[serde(default)]
    pub extraction: ExtractionDef,
    pub upgrade_cap: Option<UpgradeCapDef>,
    #[serde(default)]
    pub type_keywords: Vec<TypeKeywordDef>,
    #[serde(default)]
    pub subjects: Vec<SubjectDef>,
}

#[derive(Debug, Deserialize)]
pub struct TableMeta {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ExtractionDef {
    pub package_id_labels: Vec<String>,
    pub section_keywords: Vec<String>,
    pub owner_labels: Vec<String>,
    pub unknown_type: String,
}

impl Default for ExtractionDef {
    fn default() -> Self {
        Self {
            package_id_labels: Vec::new(),
            section_keywords: vec!["Tokens".to_string(), "Objects".to_string()],
            owner_labels: vec!["Owner".to_string(), "owner".to_string()],
            unknown_type: "UnknownObject".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpgradeCapDef {
    pub pattern: String,
    pub object_type: String,
    pub short_type: String,
}

#[derive(Debug, Deserialize)]
pub struct TypeKeywordDef {
    pub short_type: String,
    pub needles: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubjectDef {
    pub name: String,
    #[serde(default)]
    pub rules: Vec<RuleDef>,
}

#[derive(Debug, Deserialize)]
pub struct RuleDef {
    pub pattern: String,
    pub short_type: String,
    pub owner: String,
}

// =============================================================================
// Runtime representation
// =============================================================================

/// A named pattern that yields one object per match.
#[derive(Debug, Clone)]
pub struct ObjectRule {
    /// Group 1 = object id; group 2 = owner address for account rules.
    pub pattern: Regex,
    pub short_type: String,
    pub owner: OwnerKind,
}

/// Rules that only apply to one subject.
#[derive(Debug, Clone)]
pub struct SubjectRules {
    pub name: String,
    pub rules: Vec<ObjectRule>,
}

/// The subject-independent upgrade capability rule.
#[derive(Debug, Clone)]
pub struct UpgradeCapRule {
    /// Group 1 = object id, group 2 = owner address.
    pub pattern: Regex,
    pub object_type: String,
    pub short_type: String,
}

/// Maps context substrings to a display type. Checked in table order.
#[derive(Debug, Clone)]
pub struct TypeKeyword {
    pub short_type: String,
    pub needles: Vec<String>,
}

/// Validated, compiled pattern table used by the extractor.
#[derive(Debug, Clone)]
pub struct PatternTable {
    pub id: String,
    pub name: String,
    pub description: String,

    /// `<label>: 0x...` patterns for alternate package id labels.
    pub package_id_labels: Vec<Regex>,

    /// A `### ` heading containing one of these names a resource section.
    pub section_keywords: Vec<String>,

    /// `**Name**: `0x..` ... <owner label>: <text>` inside resource sections.
    pub resource_block: Regex,

    /// `Object ID: `0x..` ... <owner label>: <text>` inside a resources blob.
    pub script_entry: Regex,

    pub unknown_type: String,
    pub type_keywords: Vec<TypeKeyword>,
    pub upgrade_cap: Option<UpgradeCapRule>,
    pub subjects: Vec<SubjectRules>,

    /// Whether this is the embedded table (true) or a user file (false).
    pub is_builtin: bool,
}

impl PatternTable {
    /// Rules for `subject`, matched by exact name.
    pub fn rules_for(&self, subject: &str) -> &[ObjectRule] {
        self.subjects
            .iter()
            .find(|s| s.name == subject)
            .map(|s| s.rules.as_slice())
            .unwrap_or(&[])
    }

    /// Classify a context snippet by the first keyword entry with a needle
    /// present in it; falls back to the table's unknown type label.
    pub fn classify_type(&self, context: &str) -> &str {
        self.type_keywords
            .iter()
            .find(|kw| kw.needles.iter().any(|n| context.contains(n.as_str())))
            .map(|kw| kw.short_type.as_str())
            .unwrap_or(self.unknown_type.as_str())
    }
}

// =============================================================================
// Validation and compilation
// =============================================================================

/// Parse a TOML string into a `PatternDefinition`.
///
/// `source_path` is used for error messages only (not for I/O).
pub fn parse_pattern_toml(
    toml_content: &str,
    source_path: &Path,
) -> Result<PatternDefinition, PatternError> {
    toml::from_str(toml_content).map_err(|e| PatternError::TomlParse {
        path: source_path.to_path_buf(),
        source: e,
    })
}

/// Validate a `PatternDefinition` and compile it into a runtime `PatternTable`.
///
/// Validates:
/// - Required fields are present and non-empty
/// - Regex patterns are valid and within size limits
/// - Rules have the capture groups their owner kind needs
/// - Subject names are unique
pub fn validate_and_compile(
    def: PatternDefinition,
    is_builtin: bool,
) -> Result<PatternTable, PatternError> {
    let id = def.table.id.clone();

    if id.is_empty() {
        return Err(PatternError::MissingField {
            table_id: "(empty)".to_string(),
            field: "table.id".to_string(),
        });
    }
    if def.table.name.is_empty() {
        return missing(&id, "table.name");
    }
    if def.extraction.owner_labels.iter().all(|l| l.trim().is_empty()) {
        return missing(&id, "extraction.owner_labels");
    }
    if def.extraction.unknown_type.is_empty() {
        return missing(&id, "extraction.unknown_type");
    }
    if def.subjects.len() > constants::MAX_SUBJECTS {
        return Err(PatternError::TooManySubjects {
            count: def.subjects.len(),
            max: constants::MAX_SUBJECTS,
        });
    }

    let package_id_labels = def
        .extraction
        .package_id_labels
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|label| {
            let pattern = format!(r"{}:[ \t]*(0x[a-f0-9]+)", regex::escape(label.trim()));
            compile_regex(&id, "extraction.package_id_labels", &pattern)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let owner_alt = def
        .extraction
        .owner_labels
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|");

    let resource_block = compile_regex(
        &id,
        "extraction.owner_labels",
        &format!(r"(?s)\*\*([^:*\n]+)\*\*:\s*`(0x[a-f0-9]+)`.*?(?:{owner_alt}):[ \t]*([^\n]*)"),
    )?;
    let script_entry = compile_regex(
        &id,
        "extraction.owner_labels",
        &format!(r"(?s)Object ID:\s*`(0x[a-f0-9]+)`.*?(?:{owner_alt}):[ \t]*([^\n]*)"),
    )?;

    let upgrade_cap = match def.upgrade_cap {
        Some(cap) => {
            if cap.object_type.is_empty() {
                return missing(&id, "upgrade_cap.object_type");
            }
            if cap.short_type.is_empty() {
                return missing(&id, "upgrade_cap.short_type");
            }
            let pattern = compile_regex(&id, "upgrade_cap.pattern", &cap.pattern)?;
            require_groups(&id, "upgrade_cap.pattern", &pattern, 2)?;
            Some(UpgradeCapRule {
                pattern,
                object_type: cap.object_type,
                short_type: cap.short_type,
            })
        }
        None => None,
    };

    let mut type_keywords = Vec::with_capacity(def.type_keywords.len());
    for (i, kw) in def.type_keywords.into_iter().enumerate() {
        if kw.short_type.is_empty() {
            return missing(&id, &format!("type_keywords[{i}].short_type"));
        }
        let needles: Vec<String> = kw.needles.into_iter().filter(|n| !n.is_empty()).collect();
        if needles.is_empty() {
            return missing(&id, &format!("type_keywords[{i}].needles"));
        }
        type_keywords.push(TypeKeyword {
            short_type: kw.short_type,
            needles,
        });
    }

    let mut seen = HashSet::new();
    let mut subjects = Vec::with_capacity(def.subjects.len());
    for subject in def.subjects {
        if subject.name.is_empty() {
            return missing(&id, "subjects.name");
        }
        if !seen.insert(subject.name.clone()) {
            return Err(PatternError::DuplicateSubject {
                table_id: id,
                name: subject.name,
            });
        }

        let mut rules = Vec::with_capacity(subject.rules.len());
        for (i, rule) in subject.rules.into_iter().enumerate() {
            let field = format!("subjects[{}].rules[{i}]", subject.name);
            if rule.short_type.is_empty() {
                return missing(&id, &format!("{field}.short_type"));
            }
            let owner = OwnerKind::parse_definite(&rule.owner).ok_or_else(|| {
                PatternError::InvalidOwner {
                    table_id: id.clone(),
                    subject: subject.name.clone(),
                    value: rule.owner.clone(),
                }
            })?;
            let pattern_field = format!("{field}.pattern");
            let pattern = compile_regex(&id, &pattern_field, &rule.pattern)?;
            let required = if owner == OwnerKind::Account { 2 } else { 1 };
            require_groups(&id, &pattern_field, &pattern, required)?;
            rules.push(ObjectRule {
                pattern,
                short_type: rule.short_type,
                owner,
            });
        }

        subjects.push(SubjectRules {
            name: subject.name,
            rules,
        });
    }

    Ok(PatternTable {
        id,
        name: def.table.name,
        description: def.table.description,
        package_id_labels,
        section_keywords: def
            .extraction
            .section_keywords
            .into_iter()
            .filter(|k| !k.is_empty())
            .collect(),
        resource_block,
        script_entry,
        unknown_type: def.extraction.unknown_type,
        type_keywords,
        upgrade_cap,
        subjects,
        is_builtin,
    })
}

fn missing<T>(table_id: &str, field: &str) -> Result<T, PatternError> {
    Err(PatternError::MissingField {
        table_id: table_id.to_string(),
        field: field.to_string(),
    })
}

/// Compile a regex pattern with length validation to prevent ReDoS.
fn compile_regex(table_id: &str, field: &str, pattern: &str) -> Result<Regex, PatternError> {
    if pattern.len() > constants::MAX_REGEX_PATTERN_LENGTH {
        return Err(PatternError::RegexTooLong {
            table_id: table_id.to_string(),
            field: field.to_string(),
            length: pattern.len(),
            max_length: constants::MAX_REGEX_PATTERN_LENGTH,
        });
    }

    Regex::new(pattern).map_err(|e| PatternError::InvalidRegex {
        table_id: table_id.to_string(),
        field: field.to_string(),
        pattern: pattern.to_string(),
        source: e,
    })
}

fn require_groups(
    table_id: &str,
    field: &str,
    regex: &Regex,
    required: usize,
) -> Result<(), PatternError> {
    // captures_len counts the implicit whole-match group.
    let found = regex.captures_len() - 1;
    if found < required {
        return Err(PatternError::MissingCaptureGroup {
            table_id: table_id.to_string(),
            field: field.to_string(),
            required,
            found,
        });
    }
    Ok(())
}

// =============================================================================
// Built-in table (embedded at compile time)
// =============================================================================

/// Embedded TOML content of the built-in table.
pub fn builtin_table_source() -> &'static str {
    include_str!("../../patterns/builtin.toml")
}

/// Load and validate the built-in table.
pub fn load_builtin_table() -> Result<PatternTable, PatternError> {
    let path = Path::new("<builtin>/builtin.toml");
    let table = parse_pattern_toml(builtin_table_source(), path)
        .and_then(|def| validate_and_compile(def, true))?;
    tracing::debug!(
        table_id = %table.id,
        subjects = table.subjects.len(),
        "Loaded built-in pattern table"
    );
    Ok(table)
}

// =============================================================================
// Tests
// =============================================================================
