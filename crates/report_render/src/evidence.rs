//! Display ordering and truncation of an option's reasons.

use serde::Serialize;

/// Reasons starting with this marker come from the AI reviewer and are listed first.
pub const PRIORITY_TAG: &str = "GEMINI";
pub const REASON_TAGS: &[&str] = &["GEMINI:", "SUPPORTS:"];
pub const MAX_VISIBLE_REASONS: usize = 4;

/// Stable partition: priority-tagged reasons first, each group in input order.
pub fn order_reasons(reasons: &[String]) -> Vec<&str> {
    let (tagged, rest): (Vec<&str>, Vec<&str>) = reasons
        .iter()
        .map(String::as_str)
        .partition(|reason| reason.starts_with(PRIORITY_TAG));
    tagged.into_iter().chain(rest).collect()
}

pub fn strip_tags(reason: &str) -> &str {
    let mut text = reason.trim_start();
    while let Some(rest) = REASON_TAGS.iter().find_map(|tag| text.strip_prefix(tag)) {
        text = rest.trim_start();
    }
    text.trim_end()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvidenceItem {
    /// Reason with tag prefixes removed.
    pub text: String,
    /// Original reason, shown as tooltip.
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvidenceList {
    pub items: Vec<EvidenceItem>,
    pub hidden: usize,
}

impl EvidenceList {
    pub fn from_reasons(reasons: &[String]) -> Self {
        let ordered = order_reasons(reasons);
        let hidden = ordered.len().saturating_sub(MAX_VISIBLE_REASONS);
        let items = ordered
            .into_iter()
            .take(MAX_VISIBLE_REASONS)
            .map(|reason| EvidenceItem {
                text: strip_tags(reason).to_string(),
                title: reason.to_string(),
            })
            .collect();
        Self { items, hidden }
    }

    pub fn more_label(&self) -> Option<String> {
        (self.hidden > 0).then(|| format!("+{} more", self.hidden))
    }
}
