use std::collections::BTreeMap;

use serde::Serialize;
use shared::{
    domain::{DecisionId, OptionId},
    protocol::{DecisionResult, OptionOutcome},
};

use crate::{
    diagram::{DiagramId, RenderedDiagram},
    document::Document,
    evidence::EvidenceList,
};

pub const PENDING_PLACEHOLDER: &str = "Report generation pending...";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedOptionView {
    /// 1-based position in the backend's ranking.
    pub rank: usize,
    pub option_id: OptionId,
    pub score: String,
    pub is_winner: bool,
    pub evidence: EvidenceList,
}

impl RankedOptionView {
    pub fn new(index: usize, option: &OptionOutcome, is_winner: bool) -> Self {
        Self {
            rank: index + 1,
            option_id: option.option_id,
            score: format_score(option.score),
            is_winner,
            evidence: EvidenceList::from_reasons(&option.reasons),
        }
    }
}

pub fn format_score(score: f64) -> String {
    format!("{score:.2}")
}

/// Ranking rows in the order the backend returned them.
pub fn rank_options(result: &DecisionResult) -> Vec<RankedOptionView> {
    let winner = result.winner().map(|option| option.option_id);
    result
        .ranked_options
        .iter()
        .enumerate()
        .map(|(index, option)| {
            RankedOptionView::new(index, option, winner == Some(option.option_id))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedDocument {
    pub document: Document,
    pub diagrams: BTreeMap<DiagramId, RenderedDiagram>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "content", rename_all = "snake_case")]
pub enum ReportView {
    Pending,
    Ready(RenderedDocument),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedView {
    pub decision_id: DecisionId,
    pub options: Vec<RankedOptionView>,
    pub report: ReportView,
}
