use std::sync::Arc;

use client_core::DecisionQueryCache;
use tracing::info;

use crate::{
    events::{UiError, UiErrorContext},
    routes::Route,
};

/// Creation page at `/`.
pub struct HomePage {
    cache: Arc<DecisionQueryCache>,
}

impl HomePage {
    pub fn new(cache: Arc<DecisionQueryCache>) -> Self {
        Self { cache }
    }

    /// Creates a decision and returns the route to navigate to.
    pub async fn submit(&self, title: &str) -> Result<Route, UiError> {
        let decision = self
            .cache
            .create_decision(title)
            .await
            .map_err(|err| UiError::from_client(UiErrorContext::CreateDecision, &err))?;
        info!(decision_id = %decision.id, title = %decision.title, "decision created");
        Ok(Route::decision(decision.id))
    }
}
