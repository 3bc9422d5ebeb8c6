//! Evidence upload state machine: Idle -> Pending -> {Success, Error}.

use std::sync::Arc;

use shared::{
    domain::{DecisionId, EvidenceDocument},
    error::ValidationError,
    protocol::UploadAck,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{ClientError, DecisionApi, DecisionQueryCache};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Pending { filename: String },
    Success(UploadAck),
    Error(String),
}

impl UploadState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

struct UploadTracker {
    latest_ticket: u64,
    state: UploadState,
}

pub struct UploadController {
    api: Arc<dyn DecisionApi>,
    cache: Arc<DecisionQueryCache>,
    tracker: Mutex<UploadTracker>,
}

impl UploadController {
    pub fn new(api: Arc<dyn DecisionApi>, cache: Arc<DecisionQueryCache>) -> Self {
        Self {
            api,
            cache,
            tracker: Mutex::new(UploadTracker {
                latest_ticket: 0,
                state: UploadState::Idle,
            }),
        }
    }

    pub async fn state(&self) -> UploadState {
        self.tracker.lock().await.state.clone()
    }

    /// Submits `document` for `decision_id`.
    ///
    /// Non-PDF documents are rejected without touching the network or the
    /// visible state. On success the cached result for `decision_id` is
    /// invalidated before the success state is published.
    pub async fn upload(
        &self,
        decision_id: DecisionId,
        document: EvidenceDocument,
    ) -> Result<UploadAck, ClientError> {
        if !document.is_pdf() {
            warn!(
                decision_id = %decision_id,
                filename = %document.filename,
                media_type = %document.media_type,
                "rejected non-pdf evidence"
            );
            return Err(ValidationError::UnsupportedMediaType {
                filename: document.filename,
                media_type: document.media_type,
            }
            .into());
        }
        if document.exceeds_size_guidance() {
            warn!(
                filename = %document.filename,
                size_bytes = document.bytes.len(),
                "uploading evidence above the 10MB size guidance"
            );
        }

        let ticket = {
            let mut tracker = self.tracker.lock().await;
            tracker.latest_ticket += 1;
            tracker.state = UploadState::Pending {
                filename: document.filename.clone(),
            };
            tracker.latest_ticket
        };

        match self.api.upload_document(decision_id, document).await {
            Ok(ack) => {
                self.cache.invalidate(decision_id).await;
                self.settle(ticket, UploadState::Success(ack.clone())).await;
                Ok(ack)
            }
            Err(err) => {
                warn!(decision_id = %decision_id, error = %err, "evidence upload failed");
                self.settle(ticket, UploadState::Error(err.to_string()))
                    .await;
                Err(err)
            }
        }
    }

    async fn settle(&self, ticket: u64, state: UploadState) {
        let mut tracker = self.tracker.lock().await;
        if tracker.latest_ticket != ticket {
            info!(
                ticket,
                latest_ticket = tracker.latest_ticket,
                "ignoring completion of superseded upload"
            );
            return;
        }
        tracker.state = state;
    }
}

#[cfg(test)]
#[path = "tests/upload_tests.rs"]
mod tests;
