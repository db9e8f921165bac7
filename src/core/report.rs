// DeployScribe - core/report.rs
//
// Markdown rendering of a collection of deployment records.
// Core layer: pure string building, no I/O.

use crate::core::model::{DeploymentRecord, ExtractedObject, OwnerKind};
use crate::util::constants;

/// Presentation settings for the markdown report.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Document heading.
    pub title: String,

    /// Network label printed under every record.
    pub network_label: String,

    /// Explorer URL template; `{digest}` is replaced with the transaction digest.
    pub explorer_url: String,

    /// Subjects in report order. Subjects not listed sort after all listed
    /// ones, keeping their input order.
    pub subject_order: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: constants::DEFAULT_REPORT_TITLE.to_string(),
            network_label: constants::DEFAULT_NETWORK_LABEL.to_string(),
            explorer_url: constants::DEFAULT_EXPLORER_URL.to_string(),
            subject_order: constants::DEFAULT_SUBJECT_ORDER
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

/// Renders records as one markdown document.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    config: ReportConfig,
}

impl Reporter {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Rank of `subject` in the configured order (1-based); unlisted
    /// subjects share `UNRANKED_SUBJECT`.
    pub fn rank(&self, subject: &str) -> usize {
        self.config
            .subject_order
            .iter()
            .position(|s| s == subject)
            .map_or(constants::UNRANKED_SUBJECT, |i| i + 1)
    }

    /// `records` in report order. The sort is stable, so equal ranks keep
    /// their input order.
    pub fn ordered<'a>(&self, records: &'a [DeploymentRecord]) -> Vec<&'a DeploymentRecord> {
        let mut sorted: Vec<&DeploymentRecord> = records.iter().collect();
        sorted.sort_by_key(|r| self.rank(&r.subject_name));
        sorted
    }

    pub fn explorer_link(&self, tx_digest: &str) -> String {
        self.config
            .explorer_url
            .replace(constants::DIGEST_PLACEHOLDER, tx_digest)
    }

    pub fn render(&self, records: &[DeploymentRecord]) -> String {
        let mut out = format!("# {}\n\n", self.config.title);
        for record in self.ordered(records) {
            self.render_record(&mut out, record);
        }
        out
    }

    fn render_record(&self, out: &mut String, record: &DeploymentRecord) {
        out.push_str(&format!(
            "## {} Contract\n\
             **Deployed**: {}\n\
             **Network**: {}\n\
             **Deployment Transaction**: `{}`\n\n",
            record.subject_name,
            record.timestamp.format("%Y-%m-%d"),
            self.config.network_label,
            record.tx_digest,
        ));

        out.push_str("### Contract Address\n");
        out.push_str(&format!("- **Package ID**: `{}`\n", record.package_id));
        out.push_str("- **Modules**: core contract modules\n\n");

        if !record.objects.is_empty() {
            out.push_str("### Contract Objects\n");
            for (short_type, members) in group_by_short_type(&record.objects) {
                out.push_str(&format!("#### {short_type}\n"));
                for (i, obj) in members.iter().enumerate() {
                    out.push_str(&format!(
                        "{}. **Object ID**: `{}`\n   - Type: `{}`\n   - Owner: {}\n",
                        i + 1,
                        obj.object_id,
                        obj.object_type,
                        ownership_line(obj),
                    ));
                }
                out.push('\n');
            }
        }

        out.push_str("### Verification\n");
        out.push_str("1. View the transaction in the explorer:\n");
        out.push_str(&format!(
            "   ```\n   {}\n   ```\n\n",
            self.explorer_link(&record.tx_digest)
        ));
    }
}

/// Objects grouped by short type, groups in first-seen order.
fn group_by_short_type(objects: &[ExtractedObject]) -> Vec<(&str, Vec<&ExtractedObject>)> {
    let mut groups: Vec<(&str, Vec<&ExtractedObject>)> = Vec::new();
    for obj in objects {
        match groups.iter_mut().find(|(t, _)| *t == obj.short_type) {
            Some((_, members)) => members.push(obj),
            None => groups.push((obj.short_type.as_str(), vec![obj])),
        }
    }
    groups
}

fn ownership_line(obj: &ExtractedObject) -> String {
    match &obj.owner_kind {
        OwnerKind::Account if !obj.owner_address.is_empty() => {
            format!("`{}` (account)", obj.owner_address)
        }
        OwnerKind::Shared => "Shared (shared object)".to_string(),
        OwnerKind::Immutable => "Immutable (immutable object)".to_string(),
        other => other.label().to_string(),
    }
}
