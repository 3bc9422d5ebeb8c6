use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    Network,
    NotFound,
}

/// Local input rejected before any request is issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("decision title must not be empty")]
    EmptyTitle,
    #[error("unsupported media type '{media_type}' for '{filename}': only PDF evidence is accepted")]
    UnsupportedMediaType { filename: String, media_type: String },
    #[error("invalid decision id '{0}'")]
    InvalidDecisionId(String),
}

impl ValidationError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::Validation
    }
}

/// Error body some backends attach to non-2xx responses (`{"detail": "..."}`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ApiErrorBody {
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}
