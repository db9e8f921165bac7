// DeployScribe - core/extractor.rs
//
// Multi-strategy extraction of deployment metadata from free-form logs.
// Core layer: accepts text or bytes, never touches the filesystem.
//
// Extraction runs in independent sub-steps (digest, package id, objects,
// timestamp). Object discovery is an ordered chain of strategies from most
// to least precise; the first strategy that yields anything wins and the rest
// are skipped. The upgrade capability check runs between the precise
// strategies and the heuristic ones: it appends to whatever a precise
// strategy found, and a match on its own also skips the heuristics.

use crate::core::discovery;
use crate::core::model::{DeploymentRecord, ExtractedObject, OwnerKind};
use crate::core::patterns::PatternTable;
use crate::util::constants;
use crate::util::error::ParseError;
use chrono::{Local, NaiveDate};
use regex::Regex;
use std::borrow::Cow;
use std::path::Path;
use std::sync::OnceLock;

/// Limits applied to each log.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    pub max_log_bytes: usize,
    pub context_window_chars: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_log_bytes: constants::DEFAULT_MAX_LOG_BYTES,
            context_window_chars: constants::DEFAULT_CONTEXT_WINDOW_CHARS,
        }
    }
}

/// The object discovery strategies, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectStrategy {
    /// `### ...` resource sections with `**Name**: `0x..`` blocks.
    ResourceSections,
    /// The `Created Objects:` block of transaction output.
    CreatedObjects,
    /// Per-subject named patterns from the pattern table.
    SubjectPatterns,
    /// A `resources="..."` variable embedded by a deploy script.
    ScriptResources,
    /// Every `Object ID: 0x..` in the text, classified by the rest of its line.
    FullTextScan,
}

impl ObjectStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            ObjectStrategy::ResourceSections => "resource-sections",
            ObjectStrategy::CreatedObjects => "created-objects",
            ObjectStrategy::SubjectPatterns => "subject-patterns",
            ObjectStrategy::ScriptResources => "script-resources",
            ObjectStrategy::FullTextScan => "full-text-scan",
        }
    }
}

type StrategyFn = fn(&Extractor, &str, &str) -> Vec<ExtractedObject>;

/// Strategies tried before the upgrade capability check.
const PRECISE_STRATEGIES: &[(ObjectStrategy, StrategyFn)] = &[
    (ObjectStrategy::ResourceSections, from_resource_sections),
    (ObjectStrategy::CreatedObjects, from_created_objects),
    (ObjectStrategy::SubjectPatterns, from_subject_patterns),
];

/// Strategies tried only when nothing, upgrade capability included, was found.
const HEURISTIC_STRATEGIES: &[(ObjectStrategy, StrategyFn)] = &[
    (ObjectStrategy::ScriptResources, from_script_resources),
    (ObjectStrategy::FullTextScan, from_full_text),
];

/// Outcome of object discovery for one log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDiscovery {
    /// The chain strategy that produced objects, if any did.
    pub strategy: Option<ObjectStrategy>,
    pub objects: Vec<ExtractedObject>,
    pub upgrade_cap_appended: bool,
}

/// Extracts `DeploymentRecord`s using a fixed pattern table and limits.
#[derive(Debug, Clone)]
pub struct Extractor {
    table: PatternTable,
    config: ExtractConfig,
}

impl Extractor {
    pub fn new(table: PatternTable, config: ExtractConfig) -> Self {
        Self { table, config }
    }

    pub fn table(&self) -> &PatternTable {
        &self.table
    }

    /// Extract a record from log text. Never fails: any internal failure
    /// yields the parse-error record for `subject_name`.
    ///
    /// `source_name` is the log's file name (or path); it supplies the
    /// timestamp and, when `subject_name` is blank, the subject.
    pub fn extract(&self, log_text: &str, subject_name: &str, source_name: &str) -> DeploymentRecord {
        let subject = resolve_subject(subject_name, source_name);
        let today = today();
        let result = self.try_extract(log_text, &subject, source_name, today);
        collapse(result, subject, today)
    }

    /// Like `extract`, but starts from raw bytes. Invalid UTF-8 degrades the
    /// record instead of being replaced lossily.
    pub fn extract_bytes(&self, raw: &[u8], subject_name: &str, source_name: &str) -> DeploymentRecord {
        let subject = resolve_subject(subject_name, source_name);
        let today = today();
        let result = self
            .check_size(raw.len(), source_name)
            .and_then(|()| {
                std::str::from_utf8(raw).map_err(|e| ParseError::InvalidEncoding {
                    source_name: source_name.to_string(),
                    source: e,
                })
            })
            .and_then(|text| self.try_extract(text, &subject, source_name, today));
        collapse(result, subject, today)
    }

    /// Fallible core of `extract`. `subject` must already be resolved.
    pub fn try_extract(
        &self,
        log_text: &str,
        subject: &str,
        source_name: &str,
        today: NaiveDate,
    ) -> Result<DeploymentRecord, ParseError> {
        self.check_size(log_text.len(), source_name)?;

        let text: Cow<'_, str> = if log_text.contains('\r') {
            Cow::Owned(log_text.replace("\r\n", "\n"))
        } else {
            Cow::Borrowed(log_text)
        };

        tracing::debug!(
            source = source_name,
            subject,
            bytes = text.len(),
            preview = %preview(&text),
            "Extraction started"
        );

        let tx_digest = extract_tx_digest(&text);
        let package_id = self.extract_package_id(&text);
        let discovery = self.discover_objects(&text, subject);
        let timestamp = timestamp_from_source(source_name).unwrap_or(today);

        tracing::debug!(
            source = source_name,
            subject,
            package_id = %package_id,
            tx_digest = %tx_digest,
            strategy = discovery.strategy.map_or("none", |s| s.label()),
            objects = discovery.objects.len(),
            upgrade_cap = discovery.upgrade_cap_appended,
            "Extraction complete"
        );

        Ok(DeploymentRecord {
            subject_name: subject.to_string(),
            package_id,
            tx_digest,
            objects: discovery.objects,
            timestamp,
        })
    }

    fn check_size(&self, size: usize, source_name: &str) -> Result<(), ParseError> {
        if size > self.config.max_log_bytes {
            return Err(ParseError::LogTooLarge {
                source_name: source_name.to_string(),
                size,
                max_size: self.config.max_log_bytes,
            });
        }
        Ok(())
    }

    /// Package id: published block, then `Package ID:` label, then the
    /// table's alternate labels. First match wins.
    pub fn extract_package_id(&self, text: &str) -> String {
        let re = structural();
        let found = re
            .published
            .captures(text)
            .or_else(|| re.package_label.captures(text))
            .or_else(|| {
                self.table
                    .package_id_labels
                    .iter()
                    .find_map(|label| label.captures(text))
            });

        match found {
            Some(caps) => caps[1].to_string(),
            None => {
                tracing::debug!("No package id pattern matched");
                constants::SENTINEL_UNKNOWN.to_string()
            }
        }
    }

    /// Run the precise strategies, the upgrade capability check, then the
    /// heuristic strategies if nothing has been found yet.
    pub fn discover_objects(&self, text: &str, subject: &str) -> ObjectDiscovery {
        let (mut strategy, mut objects) = self.run_strategies(PRECISE_STRATEGIES, text, subject);

        let mut upgrade_cap_appended = false;
        if let Some(cap) = self.upgrade_cap(text) {
            if objects.iter().any(|o| o.object_id == cap.object_id) {
                tracing::debug!(object_id = %cap.object_id, "Upgrade capability already listed");
            } else {
                tracing::debug!(object_id = %cap.object_id, "Upgrade capability appended");
                objects.push(cap);
                upgrade_cap_appended = true;
            }
        }

        if objects.is_empty() {
            (strategy, objects) = self.run_strategies(HEURISTIC_STRATEGIES, text, subject);
        }

        ObjectDiscovery {
            strategy,
            objects,
            upgrade_cap_appended,
        }
    }

    /// First strategy in `chain` that yields objects, with its objects.
    fn run_strategies(
        &self,
        chain: &[(ObjectStrategy, StrategyFn)],
        text: &str,
        subject: &str,
    ) -> (Option<ObjectStrategy>, Vec<ExtractedObject>) {
        for (kind, run) in chain {
            let found = run(self, text, subject);
            if !found.is_empty() {
                tracing::debug!(
                    strategy = kind.label(),
                    objects = found.len(),
                    "Object strategy matched"
                );
                return (Some(*kind), found);
            }
            tracing::trace!(strategy = kind.label(), "Object strategy found nothing");
        }
        (None, Vec::new())
    }

    fn upgrade_cap(&self, text: &str) -> Option<ExtractedObject> {
        let rule = self.table.upgrade_cap.as_ref()?;
        let caps = rule.pattern.captures(text)?;
        Some(ExtractedObject::new(
            &caps[1],
            rule.object_type.as_str(),
            rule.short_type.as_str(),
            OwnerKind::Account,
            &caps[2],
        ))
    }
}

fn collapse(
    result: Result<DeploymentRecord, ParseError>,
    subject: String,
    today: NaiveDate,
) -> DeploymentRecord {
    match result {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(subject = %subject, error = %e, "Log degraded to parse-error record");
            DeploymentRecord::parse_error(subject, today)
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Declared subject, else the file-name convention, else the file stem.
fn resolve_subject(subject_name: &str, source_name: &str) -> String {
    let declared = subject_name.trim();
    if !declared.is_empty() {
        return declared.to_string();
    }
    let file_name = base_name(source_name);
    discovery::subject_from_file_name(file_name)
        .or_else(|| {
            Path::new(file_name)
                .file_stem()
                .and_then(|s| s.to_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| constants::SENTINEL_UNKNOWN.to_string())
}

fn base_name(source_name: &str) -> &str {
    Path::new(source_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(source_name)
}

/// Date embedded as `_YYYY-MM-DD.log` in the source's file name.
pub fn timestamp_from_source(source_name: &str) -> Option<NaiveDate> {
    let caps = structural().file_date.captures(base_name(source_name))?;
    NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok()
}

fn extract_tx_digest(text: &str) -> String {
    structural()
        .tx_digest
        .captures(text)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| constants::SENTINEL_UNKNOWN.to_string())
}

fn preview(text: &str) -> String {
    text.chars()
        .take(constants::DEBUG_MAX_PREVIEW)
        .collect::<String>()
        .replace('\n', "\\n")
}

// =============================================================================
// Structural patterns
// =============================================================================

/// Patterns fixed by the upstream tool output rather than by the project.
struct Structural {
    tx_digest: Regex,
    published: Regex,
    package_label: Regex,
    section_heading: Regex,
    created_entry: Regex,
    resources_blob: Regex,
    object_id: Regex,
    backtick_hex: Regex,
    address: Regex,
    file_date: Regex,
}

fn structural() -> &'static Structural {
    static STRUCTURAL: OnceLock<Structural> = OnceLock::new();

    STRUCTURAL.get_or_init(|| {
        // Literal patterns; every one is exercised by the tests below.
        fn re(pat: &str) -> Regex {
            Regex::new(pat).expect("extractor: invalid structural regex")
        }

        Structural {
            tx_digest: re(r"Transaction Digest: ([a-zA-Z0-9]+)"),
            published: re(r"(?s)Published Objects:.*?\n\s*(0x[a-f0-9]+)"),
            package_label: re(r"Package ID:[ \t]*(0x[a-f0-9]+)"),
            section_heading: re(r"###[ \t]+([^\n]+)"),
            // The optional address may not cross a ':' so an entry never
            // claims the address that belongs to the entry after it.
            created_entry: re(
                r"(?is)(0x[a-f0-9]+).*?([A-Za-z0-9_]+(?:::[A-Za-z0-9_]+)+).*?owner:[ \t]*([A-Za-z]+)(?:[^:]*?Address:[ \t]*(0x[a-f0-9]+))?",
            ),
            resources_blob: re(r#"(?s)resources="(.*?)""#),
            object_id: re(r"Object ID: (0x[a-f0-9]+)"),
            backtick_hex: re(r"`(0x[a-f0-9]+)`"),
            address: re(r"Address: (0x[a-f0-9]+)"),
            file_date: re(r"_(\d{4}-\d{2}-\d{2})\.log"),
        }
    })
}

// =============================================================================
// Object strategies
// =============================================================================

/// Owner from free text after an owner label: Immutable, Shared, or a
/// backtick-quoted account address.
fn classify_owner_text(owner_text: &str) -> (OwnerKind, String) {
    if owner_text.contains("Immutable") {
        (OwnerKind::Immutable, String::new())
    } else if owner_text.contains("Shared") {
        (OwnerKind::Shared, String::new())
    } else if let Some(caps) = structural().backtick_hex.captures(owner_text) {
        (OwnerKind::Account, caps[1].to_string())
    } else {
        (OwnerKind::unknown(), String::new())
    }
}

fn qualified(subject: &str, short_type: &str) -> String {
    format!("{}::{short_type}", subject.to_lowercase())
}

/// Body of a `###` section: from `start` to the next `###` or end of text.
fn section_body(text: &str, start: usize) -> &str {
    let rest = &text[start..];
    match rest.find("###") {
        Some(end) => &rest[..end],
        None => rest,
    }
}

fn from_resource_sections(ex: &Extractor, text: &str, subject: &str) -> Vec<ExtractedObject> {
    let mut objects = Vec::new();

    for heading in structural().section_heading.captures_iter(text) {
        let title = &heading[1];
        if !ex
            .table
            .section_keywords
            .iter()
            .any(|k| title.contains(k.as_str()))
        {
            continue;
        }

        let Some(whole) = heading.get(0) else { continue };
        let body = section_body(text, whole.end());
        for block in ex.table.resource_block.captures_iter(body) {
            let name = block[1].trim();
            let (owner_kind, owner_address) = classify_owner_text(block[3].trim());
            objects.push(ExtractedObject::new(
                &block[2],
                qualified(subject, name),
                name,
                owner_kind,
                owner_address,
            ));
        }
    }

    objects
}

/// Text following `Created Objects:` up to a blank line, an `Executed`
/// line, or end of text.
fn created_objects_block(text: &str) -> Option<&str> {
    const MARKER: &str = "Created Objects:";
    let start = text.find(MARKER)? + MARKER.len();
    let rest = &text[start..];
    let end = [rest.find("\n\n"), rest.find("\nExecuted")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

/// `ACCOUNT` / `account` -> `Account`.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn from_created_objects(_ex: &Extractor, text: &str, _subject: &str) -> Vec<ExtractedObject> {
    let Some(block) = created_objects_block(text) else {
        return Vec::new();
    };

    structural()
        .created_entry
        .captures_iter(block)
        .map(|entry| {
            let object_type = &entry[2];
            let short_type = object_type.rsplit("::").next().unwrap_or(object_type);
            let owner_kind = OwnerKind::from_keyword(&capitalize(&entry[3]));
            let owner_address = entry.get(4).map_or("", |m| m.as_str());
            ExtractedObject::new(&entry[1], object_type, short_type, owner_kind, owner_address)
        })
        .collect()
}

fn from_subject_patterns(ex: &Extractor, text: &str, subject: &str) -> Vec<ExtractedObject> {
    let mut objects = Vec::new();

    for rule in ex.table.rules_for(subject) {
        for caps in rule.pattern.captures_iter(text) {
            let Some(id) = caps.get(1) else { continue };
            let owner_address = match rule.owner {
                OwnerKind::Account => caps.get(2).map_or("", |m| m.as_str()),
                _ => "",
            };
            objects.push(ExtractedObject::new(
                id.as_str(),
                qualified(subject, &rule.short_type),
                rule.short_type.as_str(),
                rule.owner.clone(),
                owner_address,
            ));
        }
    }

    objects
}

/// The last `lines` newline-separated segments of `text[..end]`.
fn preceding_lines(text: &str, end: usize, lines: usize) -> &str {
    let prefix = &text[..end];
    let mut start = prefix.len();
    for _ in 0..lines {
        match prefix[..start].rfind('\n') {
            Some(i) => start = i,
            None => return prefix,
        }
    }
    &prefix[start + 1..]
}

fn from_script_resources(ex: &Extractor, text: &str, subject: &str) -> Vec<ExtractedObject> {
    let Some(blob) = structural()
        .resources_blob
        .captures(text)
        .and_then(|caps| caps.get(1))
    else {
        return Vec::new();
    };
    let blob = blob.as_str();

    ex.table
        .script_entry
        .captures_iter(blob)
        .filter_map(|entry| {
            let whole = entry.get(0)?;
            let context = preceding_lines(blob, whole.start(), constants::SCRIPT_CONTEXT_LINES);
            let short_type = ex.table.classify_type(context);
            let (owner_kind, owner_address) = classify_owner_text(entry[2].trim());
            Some(ExtractedObject::new(
                &entry[1],
                qualified(subject, short_type),
                short_type,
                owner_kind,
                owner_address,
            ))
        })
        .collect()
}

/// Up to `chars` characters on each side of `text[start..end]`, never
/// leaving the line that contains it. Respects UTF-8 boundaries.
fn line_window(text: &str, start: usize, end: usize, chars: usize) -> &str {
    let line_start = text[..start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = text[end..].find('\n').map_or(text.len(), |i| end + i);

    let from = text[line_start..start]
        .char_indices()
        .rev()
        .take(chars)
        .last()
        .map_or(start, |(i, _)| line_start + i);
    let to = text[end..line_end]
        .char_indices()
        .nth(chars)
        .map_or(line_end, |(i, _)| end + i);
    &text[from..to]
}

fn from_full_text(ex: &Extractor, text: &str, subject: &str) -> Vec<ExtractedObject> {
    let re = structural();
    let mut objects: Vec<ExtractedObject> = Vec::new();

    for caps in re.object_id.captures_iter(text) {
        let Some(id) = caps.get(1) else { continue };
        if objects.iter().any(|o| o.object_id == id.as_str()) {
            continue;
        }

        let context = line_window(text, id.start(), id.end(), ex.config.context_window_chars);
        let short_type = ex.table.classify_type(context);

        let (owner_kind, owner_address) = if context.contains("Immutable") {
            (OwnerKind::Immutable, "")
        } else if context.contains("Shared") {
            (OwnerKind::Shared, "")
        } else if context.contains("Owner: Account") {
            let address = re
                .address
                .captures(context)
                .and_then(|c| c.get(1))
                .map_or("", |m| m.as_str());
            (OwnerKind::Account, address)
        } else {
            (OwnerKind::unknown(), "")
        };

        objects.push(ExtractedObject::new(
            id.as_str(),
            qualified(subject, short_type),
            short_type,
            owner_kind,
            owner_address,
        ));
    }

    objects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::patterns;

    fn extractor() -> Extractor {
        Extractor::new(
            patterns::load_builtin_table().expect("built-in table"),
            ExtractConfig::default(),
        )
    }

    fn ids(objects: &[ExtractedObject]) -> Vec<&str> {
        objects.iter().map(|o| o.object_id.as_str()).collect()
    }

    const RESOURCE_SECTION_LOG: &str = "\
Transaction Digest: 9xYzDigest
### 已创建代币
- **TreasuryCap**: `0xaaa1`
  - 所有者: `0xbbb1`
- **CoinMetadata**: `0xaaa2`
  - 所有者: Immutable
- **Registry**: `0xaaa3`
  - 所有者: Shared
### 其他
Created Objects:
  ID: 0xccc1 Type: coin::TreasuryCap Owner: Shared
";

    const UPGRADE_CAP_TAIL: &str = "\
UpgradeCap created
Object ID: 0xddd1
Owner: Account Address: 0xeee1
";

    // -------------------------------------------------------------------------
    // Package id and digest
    // -------------------------------------------------------------------------

    #[test]
    fn test_package_id_from_label() {
        let ex = extractor();
        let rec = ex.extract("noise\nPackage ID: 0xabc123\nmore", "Coin", "c.log");
        assert_eq!(rec.package_id, "0xabc123");
    }

    #[test]
    fn test_published_block_beats_label() {
        let ex = extractor();
        let log = "Package ID: 0x1111\nPublished Objects:\n  PackageID follows\n  0x2222\n";
        let rec = ex.extract(log, "Coin", "c.log");
        assert_eq!(rec.package_id, "0x2222");
    }

    #[test]
    fn test_localized_package_label() {
        let ex = extractor();
        let rec = ex.extract("提取到的Package ID: 0x3333", "Coin", "c.log");
        assert_eq!(rec.package_id, "0x3333");
    }

    #[test]
    fn test_missing_fields_use_unknown_sentinel() {
        let ex = extractor();
        let rec = ex.extract("nothing to see here", "Coin", "c.log");
        assert_eq!(rec.package_id, constants::SENTINEL_UNKNOWN);
        assert_eq!(rec.tx_digest, constants::SENTINEL_UNKNOWN);
        assert!(rec.objects.is_empty());
        assert!(!rec.is_parse_error());
    }

    // -------------------------------------------------------------------------
    // Strategy 1: resource sections
    // -------------------------------------------------------------------------

    #[test]
    fn test_resource_section_blocks_and_owners() {
        let ex = extractor();
        let rec = ex.extract(RESOURCE_SECTION_LOG, "Coin", "Coin_deploy_2024-05-01.log");

        assert_eq!(rec.tx_digest, "9xYzDigest");
        assert_eq!(ids(&rec.objects), vec!["0xaaa1", "0xaaa2", "0xaaa3"]);

        let cap = &rec.objects[0];
        assert_eq!(cap.object_type, "coin::TreasuryCap");
        assert_eq!(cap.short_type, "TreasuryCap");
        assert_eq!(cap.owner_kind, OwnerKind::Account);
        assert_eq!(cap.owner_address, "0xbbb1");

        assert_eq!(rec.objects[1].owner_kind, OwnerKind::Immutable);
        assert!(rec.objects[1].owner_address.is_empty());
        assert_eq!(rec.objects[2].owner_kind, OwnerKind::Shared);
    }

    #[test]
    fn test_first_successful_strategy_short_circuits_the_rest() {
        let ex = extractor();

        // The Created Objects block alone would yield a different object.
        let alone = from_created_objects(&ex, RESOURCE_SECTION_LOG, "Coin");
        assert_eq!(ids(&alone), vec!["0xccc1"]);

        let found = ex.discover_objects(RESOURCE_SECTION_LOG, "Coin");
        assert_eq!(found.strategy, Some(ObjectStrategy::ResourceSections));
        assert_eq!(ids(&found.objects), vec!["0xaaa1", "0xaaa2", "0xaaa3"]);
        assert!(!found.upgrade_cap_appended);
    }

    #[test]
    fn test_every_matching_section_contributes() {
        let ex = extractor();
        let log = "\
### Tokens
- **Alpha**: `0x01`
  - Owner: Shared
### Notes
- **Ignored**: `0x02`
  - Owner: Shared
### Created Objects
- **Beta**: `0x03`
  - Owner: Immutable
";
        let found = ex.discover_objects(log, "Coin");
        assert_eq!(ids(&found.objects), vec!["0x01", "0x03"]);
    }

    // -------------------------------------------------------------------------
    // Strategy 2: Created Objects
    // -------------------------------------------------------------------------

    #[test]
    fn test_created_objects_round_trip() {
        let ex = extractor();
        let log = "\
Transaction Digest: abc123
Package ID: 0xdead
Created Objects:
  - ID: 0xbeef
    Type: mod::Cap
    Owner: Account
    Address: 0xfeed";
        let rec = ex.extract(log, "Whatever", "w.log");

        assert_eq!(rec.tx_digest, "abc123");
        assert_eq!(rec.package_id, "0xdead");
        assert_eq!(
            rec.objects,
            vec![ExtractedObject {
                object_id: "0xbeef".to_string(),
                object_type: "mod::Cap".to_string(),
                short_type: "Cap".to_string(),
                owner_kind: OwnerKind::Account,
                owner_address: "0xfeed".to_string(),
            }]
        );
    }

    #[test]
    fn test_created_entry_does_not_claim_next_entry_address() {
        let ex = extractor();
        let log = "\
Created Objects:
  ID: 0xa1 Type: m::Meta Owner: IMMUTABLE
  ID: 0xa2 Type: 0x2::package::UpgradeCap owner: account Address: 0xa3

Executed";
        let objects = from_created_objects(&ex, log, "X");
        assert_eq!(ids(&objects), vec!["0xa1", "0xa2"]);
        assert_eq!(objects[0].owner_kind, OwnerKind::Immutable);
        assert!(objects[0].owner_address.is_empty());
        assert_eq!(objects[1].object_type, "0x2::package::UpgradeCap");
        assert_eq!(objects[1].short_type, "UpgradeCap");
        assert_eq!(objects[1].owner_kind, OwnerKind::Account);
        assert_eq!(objects[1].owner_address, "0xa3");
    }

    #[test]
    fn test_created_objects_keeps_unrecognised_owner_label() {
        let ex = extractor();
        let log = "Created Objects:\n  0xb1 m::Wrapped Owner: OBJECTOWNER\n";
        let objects = from_created_objects(&ex, log, "X");
        assert_eq!(
            objects[0].owner_kind,
            OwnerKind::Unknown("Objectowner".to_string())
        );
    }

    // -------------------------------------------------------------------------
    // Strategy 3: subject patterns
    // -------------------------------------------------------------------------

    const FUND_LOG: &str = "\
Deploying fund contract
FinancePool created
Object ID: 0xf1
InsuranceCapability transferred
Object ID: 0xf2
Owner: Account Address: 0xf3
";

    #[test]
    fn test_subject_patterns_for_known_subject() {
        let ex = extractor();
        let found = ex.discover_objects(FUND_LOG, "Fund");
        assert_eq!(found.strategy, Some(ObjectStrategy::SubjectPatterns));
        assert_eq!(ids(&found.objects), vec!["0xf1", "0xf2"]);

        let pool = &found.objects[0];
        assert_eq!(pool.object_type, "fund::FinancePool");
        assert_eq!(pool.owner_kind, OwnerKind::Shared);

        let cap = &found.objects[1];
        assert_eq!(cap.short_type, "InsuranceCapability");
        assert_eq!(cap.owner_kind, OwnerKind::Account);
        assert_eq!(cap.owner_address, "0xf3");
    }

    #[test]
    fn test_unknown_subject_falls_through_to_full_text() {
        let ex = extractor();
        let found = ex.discover_objects(FUND_LOG, "Widget");
        assert_eq!(found.strategy, Some(ObjectStrategy::FullTextScan));
        assert_eq!(ids(&found.objects), vec!["0xf1", "0xf2"]);
    }

    // -------------------------------------------------------------------------
    // Upgrade capability
    // -------------------------------------------------------------------------

    #[test]
    fn test_upgrade_cap_appended_after_resource_sections() {
        let ex = extractor();
        let log = format!("{RESOURCE_SECTION_LOG}{UPGRADE_CAP_TAIL}");
        let rec = ex.extract(&log, "Coin", "c.log");

        assert_eq!(
            ids(&rec.objects),
            vec!["0xaaa1", "0xaaa2", "0xaaa3", "0xddd1"]
        );
        let cap = rec.objects.last().unwrap();
        assert_eq!(cap.object_type, "sui::package::UpgradeCap");
        assert_eq!(cap.short_type, "UpgradeCap");
        assert_eq!(cap.owner_kind, OwnerKind::Account);
        assert_eq!(cap.owner_address, "0xeee1");
    }

    #[test]
    fn test_upgrade_cap_appended_after_subject_patterns() {
        let ex = extractor();
        let log = format!("{FUND_LOG}{UPGRADE_CAP_TAIL}");
        let found = ex.discover_objects(&log, "Fund");
        assert_eq!(found.strategy, Some(ObjectStrategy::SubjectPatterns));
        assert!(found.upgrade_cap_appended);
        assert_eq!(found.objects.last().unwrap().object_id, "0xddd1");
    }

    #[test]
    fn test_upgrade_cap_alone_skips_heuristic_strategies() {
        let ex = extractor();
        // Nothing precise matches; the stray id below would be picked up by
        // the full-text scan if it ran.
        let log = format!("{UPGRADE_CAP_TAIL}\nnoise\nObject ID: 0x99\nOwner: Shared");
        let found = ex.discover_objects(&log, "Widget");

        assert_eq!(found.strategy, None);
        assert!(found.upgrade_cap_appended);
        assert_eq!(ids(&found.objects), vec!["0xddd1"]);
        let cap = &found.objects[0];
        assert_eq!(cap.object_type, "sui::package::UpgradeCap");
        assert_eq!(cap.short_type, "UpgradeCap");
        assert_eq!(cap.owner_kind, OwnerKind::Account);
        assert_eq!(cap.owner_address, "0xeee1");
    }

    #[test]
    fn test_upgrade_cap_not_duplicated() {
        let ex = extractor();
        let log = "\
Created Objects:
  ID: 0xddd1 Type: 0x2::package::UpgradeCap Owner: Account Address: 0xeee1

UpgradeCap
Object ID: 0xddd1
Owner: Account Address: 0xeee1
";
        let found = ex.discover_objects(log, "Widget");
        assert_eq!(found.strategy, Some(ObjectStrategy::CreatedObjects));
        assert!(!found.upgrade_cap_appended);
        assert_eq!(ids(&found.objects), vec!["0xddd1"]);
    }

    // -------------------------------------------------------------------------
    // Strategy 4: embedded script variable
    // -------------------------------------------------------------------------

    #[test]
    fn test_script_resources_classified_by_preceding_lines() {
        let ex = extractor();
        let log = "\
#!/bin/bash
resources=\"
代币铸币权限 (TreasuryCap)
Object ID: `0x71`
所有者: `0x72`

元数据
Object ID: `0x73`
所有者: Immutable
\"
echo done";
        let found = ex.discover_objects(log, "Coin");
        assert_eq!(found.strategy, Some(ObjectStrategy::ScriptResources));
        assert_eq!(ids(&found.objects), vec!["0x71", "0x73"]);

        assert_eq!(found.objects[0].short_type, "TreasuryCap");
        assert_eq!(found.objects[0].object_type, "coin::TreasuryCap");
        assert_eq!(found.objects[0].owner_kind, OwnerKind::Account);
        assert_eq!(found.objects[0].owner_address, "0x72");

        assert_eq!(found.objects[1].short_type, "Metadata");
        assert_eq!(found.objects[1].owner_kind, OwnerKind::Immutable);
    }

    #[test]
    fn test_preceding_lines_takes_last_segments() {
        let text = "a\nb\nc\nd\nObject";
        let end = text.find("Object").unwrap();
        assert_eq!(preceding_lines(text, end, 3), "c\nd\n");
        assert_eq!(preceding_lines("x\nObject", 2, 3), "x\n");
    }

    // -------------------------------------------------------------------------
    // Strategy 5: full-text scan
    // -------------------------------------------------------------------------

    #[test]
    fn test_full_text_scan_suppresses_duplicates() {
        let ex = extractor();
        let log = "PolicyManager Object ID: 0x91 Owner: Shared\nObject ID: 0x91\n";
        let found = ex.discover_objects(log, "Widget");
        assert_eq!(found.strategy, Some(ObjectStrategy::FullTextScan));
        assert_eq!(ids(&found.objects), vec!["0x91"]);
        assert_eq!(found.objects[0].short_type, "PolicyManager");
        assert_eq!(found.objects[0].owner_kind, OwnerKind::Shared);
    }

    #[test]
    fn test_full_text_scan_adjacent_lines_stay_apart() {
        let ex = extractor();
        let log = "\
Metadata Object ID: 0x1 Owner: Immutable
TreasuryCap Object ID: 0x2 Owner: Account Address: 0x3
Object ID: 0x4
PolicyManager Object ID: 0x5 Owner: Shared";
        let found = ex.discover_objects(log, "Widget");
        assert_eq!(found.strategy, Some(ObjectStrategy::FullTextScan));
        assert_eq!(ids(&found.objects), vec!["0x1", "0x2", "0x4", "0x5"]);

        assert_eq!(found.objects[0].short_type, "Metadata");
        assert_eq!(found.objects[0].owner_kind, OwnerKind::Immutable);

        assert_eq!(found.objects[1].short_type, "TreasuryCap");
        assert_eq!(found.objects[1].owner_kind, OwnerKind::Account);
        assert_eq!(found.objects[1].owner_address, "0x3");

        assert_eq!(found.objects[2].short_type, "UnknownObject");
        assert_eq!(found.objects[2].owner_kind, OwnerKind::unknown());

        assert_eq!(found.objects[3].short_type, "PolicyManager");
        assert_eq!(found.objects[3].owner_kind, OwnerKind::Shared);
    }

    #[test]
    fn test_full_text_scan_window_limited_on_long_line() {
        let ex = extractor();
        let padding = ".".repeat(300);
        let log = format!(
            "AdminCap Object ID: 0xa1 Owner: Account Address: 0xb1{padding} BondPool Object ID: 0xa2 Owner: Shared"
        );
        let found = ex.discover_objects(&log, "Widget");
        assert_eq!(ids(&found.objects), vec!["0xa1", "0xa2"]);

        assert_eq!(found.objects[0].short_type, "AdminCap");
        assert_eq!(found.objects[0].owner_kind, OwnerKind::Account);
        assert_eq!(found.objects[0].owner_address, "0xb1");
        assert_eq!(found.objects[0].object_type, "widget::AdminCap");

        assert_eq!(found.objects[1].short_type, "BondPool");
        assert_eq!(found.objects[1].owner_kind, OwnerKind::Shared);
    }

    #[test]
    fn test_full_text_scan_unknown_type_label() {
        let ex = extractor();
        let found = ex.discover_objects("Object ID: 0x55", "Widget");
        assert_eq!(found.objects[0].short_type, "UnknownObject");
        assert_eq!(found.objects[0].owner_kind, OwnerKind::unknown());
    }

    #[test]
    fn test_line_window_respects_utf8() {
        let text = "代币代币X代币代币";
        let start = text.find('X').unwrap();
        assert_eq!(line_window(text, start, start + 1, 2), "代币X代币");
        assert_eq!(line_window(text, start, start + 1, 100), text);
    }

    #[test]
    fn test_line_window_stops_at_line_breaks() {
        let text = "above\nleft X right\nbelow";
        let start = text.find('X').unwrap();
        assert_eq!(line_window(text, start, start + 1, 100), "left X right");
        assert_eq!(line_window(text, start, start + 1, 3), "ft X ri");
        assert_eq!(line_window("X", 0, 1, 5), "X");
    }

    // -------------------------------------------------------------------------
    // Timestamps, subjects, and failure degradation
    // -------------------------------------------------------------------------

    #[test]
    fn test_timestamp_from_file_name() {
        let ex = extractor();
        let rec = ex.extract("", "Bond", "/logs/Bond_deploy_2024-05-01.log");
        assert_eq!(rec.timestamp, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn test_timestamp_falls_back_to_today() {
        let ex = extractor();
        let before = today();
        let rec = ex.extract("", "Bond", "Bond_deploy_2024-13-45.log");
        let after = today();
        assert!(rec.timestamp == before || rec.timestamp == after);
    }

    #[test]
    fn test_blank_subject_derived_from_file_name() {
        let ex = extractor();
        let rec = ex.extract("", "  ", "Insurance_deploy_2024-05-01.log");
        assert_eq!(rec.subject_name, "Insurance");
        let rec = ex.extract("", "", "notes.txt");
        assert_eq!(rec.subject_name, "notes");
    }

    #[test]
    fn test_invalid_utf8_degrades_without_stopping_the_batch() {
        let ex = extractor();
        let bad: &[u8] = b"Transaction Digest: abc\xff\xfe Package ID: 0x12";
        let good: &[u8] = b"Transaction Digest: def\nPackage ID: 0x34";

        let records: Vec<_> = [bad, good]
            .iter()
            .map(|raw| ex.extract_bytes(raw, "Coin", "Coin_deploy_2024-05-01.log"))
            .collect();

        assert_eq!(records[0].package_id, constants::SENTINEL_PARSE_ERROR);
        assert_eq!(records[0].tx_digest, constants::SENTINEL_PARSE_ERROR);
        assert!(records[0].objects.is_empty());
        assert_eq!(records[0].subject_name, "Coin");

        assert_eq!(records[1].tx_digest, "def");
        assert_eq!(records[1].package_id, "0x34");
    }

    #[test]
    fn test_oversized_log_degrades() {
        let ex = Extractor::new(
            patterns::load_builtin_table().unwrap(),
            ExtractConfig {
                max_log_bytes: 16,
                ..ExtractConfig::default()
            },
        );
        let rec = ex.extract("Package ID: 0x1234567890abcdef", "Pool", "p.log");
        assert!(rec.is_parse_error());

        let err = ex
            .try_extract("Package ID: 0x1234567890abcdef", "Pool", "p.log", today())
            .unwrap_err();
        assert!(matches!(err, ParseError::LogTooLarge { max_size: 16, .. }));
    }

    #[test]
    fn test_crlf_logs_parse_like_lf_logs() {
        let ex = extractor();
        let log = RESOURCE_SECTION_LOG.replace('\n', "\r\n");
        let rec = ex.extract(&log, "Coin", "c.log");
        assert_eq!(ids(&rec.objects), vec!["0xaaa1", "0xaaa2", "0xaaa3"]);
    }
}
