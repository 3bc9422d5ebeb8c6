use async_trait::async_trait;
use shared::{
    domain::{Decision, DecisionId, EvidenceDocument},
    protocol::{DecisionResult, UploadAck},
};

pub mod error;
pub mod evidence;
pub mod query_cache;
pub mod transport;
pub mod upload;

pub use error::ClientError;
pub use query_cache::{AnalysisTrigger, DecisionQueryCache, FetchOutcome};
pub use transport::HttpDecisionApi;
pub use upload::{UploadController, UploadState};

/// Backend operations the client depends on. Every call is a suspension point.
#[async_trait]
pub trait DecisionApi: Send + Sync {
    async fn create_decision(&self, title: &str) -> Result<Decision, ClientError>;
    async fn upload_document(
        &self,
        decision_id: DecisionId,
        document: EvidenceDocument,
    ) -> Result<UploadAck, ClientError>;
    async fn fetch_result(&self, decision_id: DecisionId) -> Result<DecisionResult, ClientError>;
}

#[cfg(test)]
#[path = "tests/fake_api.rs"]
mod fake_api;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
