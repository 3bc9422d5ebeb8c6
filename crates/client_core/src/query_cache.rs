//! On-demand cache of evaluated decision results.
//!
//! Entries are only populated by an explicit analysis run. Every run and every
//! invalidation advances the entry's epoch; a fetch that completes under an
//! older epoch is discarded instead of being stored. A stored result is always
//! fresh: invalidation evicts it rather than marking it stale.

use std::{collections::HashMap, sync::Arc};

use shared::{
    domain::{Decision, DecisionId},
    error::ValidationError,
    protocol::DecisionResult,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{ClientError, DecisionApi};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisTrigger {
    Run,
    Rerun,
}

impl AnalysisTrigger {
    pub fn label(self) -> &'static str {
        match self {
            Self::Run => "Run Analysis",
            Self::Rerun => "Re-run Analysis",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Applied(Arc<DecisionResult>),
    /// A later run or an upload invalidated this fetch before it completed.
    Superseded,
}

#[derive(Debug, Default)]
struct CacheEntry {
    epoch: u64,
    runs: u32,
    in_flight: bool,
    result: Option<Arc<DecisionResult>>,
}

pub struct DecisionQueryCache {
    api: Arc<dyn DecisionApi>,
    entries: Mutex<HashMap<DecisionId, CacheEntry>>,
}

impl DecisionQueryCache {
    pub fn new(api: Arc<dyn DecisionApi>) -> Self {
        Self {
            api,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn create_decision(&self, title: &str) -> Result<Decision, ClientError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }
        self.api.create_decision(title).await
    }

    pub async fn cached(&self, decision_id: DecisionId) -> Option<Arc<DecisionResult>> {
        let entries = self.entries.lock().await;
        entries.get(&decision_id)?.result.clone()
    }

    pub async fn trigger_for(&self, decision_id: DecisionId) -> AnalysisTrigger {
        let entries = self.entries.lock().await;
        match entries.get(&decision_id) {
            Some(entry) if entry.runs > 0 => AnalysisTrigger::Rerun,
            _ => AnalysisTrigger::Run,
        }
    }

    pub async fn is_fetching(&self, decision_id: DecisionId) -> bool {
        let entries = self.entries.lock().await;
        entries
            .get(&decision_id)
            .map(|entry| entry.in_flight)
            .unwrap_or(false)
    }

    /// Fetches the evaluated result for `decision_id` and stores it,
    /// unless a newer run or an invalidation happened while it was in flight.
    ///
    /// Failures are returned as-is; there is no retry.
    pub async fn run_analysis(&self, decision_id: DecisionId) -> Result<FetchOutcome, ClientError> {
        let epoch = {
            let mut entries = self.entries.lock().await;
            let entry = entries.entry(decision_id).or_default();
            entry.epoch += 1;
            entry.runs += 1;
            entry.in_flight = true;
            entry.epoch
        };
        info!(decision_id = %decision_id, epoch, "analysis requested");

        let fetched = self.api.fetch_result(decision_id).await;

        let mut entries = self.entries.lock().await;
        let entry = entries.entry(decision_id).or_default();
        if entry.epoch != epoch {
            warn!(
                decision_id = %decision_id,
                epoch,
                current_epoch = entry.epoch,
                "discarding superseded analysis result"
            );
            return Ok(FetchOutcome::Superseded);
        }
        entry.in_flight = false;

        let result = Arc::new(fetched?);
        entry.result = Some(Arc::clone(&result));
        Ok(FetchOutcome::Applied(result))
    }

    /// Evicts the cached result for `decision_id`; the next view needs a new run.
    pub async fn invalidate(&self, decision_id: DecisionId) {
        let mut entries = self.entries.lock().await;
        let entry = entries.entry(decision_id).or_default();
        entry.epoch += 1;
        entry.in_flight = false;
        entry.result = None;
        info!(decision_id = %decision_id, epoch = entry.epoch, "decision result invalidated");
    }
}

#[cfg(test)]
#[path = "tests/query_cache_tests.rs"]
mod tests;
