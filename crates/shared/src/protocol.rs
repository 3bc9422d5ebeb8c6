use serde::{Deserialize, Serialize};

use crate::domain::{DecisionId, OptionId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDecisionRequest {
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadAck {
    pub filename: String,
    pub status: String,
    pub linked_to_decision: DecisionId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionOutcome {
    pub option_id: OptionId,
    pub score: f64,
    #[serde(default)]
    pub reasons: Vec<String>,
}

/// Evaluated output for one decision as returned by `GET /decisions/{id}/evaluate`.
///
/// `ranked_options` is authoritative for rank: index 0 is the winner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub decision_id: DecisionId,
    #[serde(default)]
    pub ranked_options: Vec<OptionOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consultant_report: Option<String>,
}

impl DecisionResult {
    /// The narrative report, or `None` while generation is still pending.
    pub fn report(&self) -> Option<&str> {
        self.consultant_report
            .as_deref()
            .filter(|report| !report.trim().is_empty())
    }

    pub fn is_pending(&self) -> bool {
        self.report().is_none()
    }

    pub fn winner(&self) -> Option<&OptionOutcome> {
        self.ranked_options.first()
    }
}
