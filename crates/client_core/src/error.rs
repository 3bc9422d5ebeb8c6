use shared::{
    domain::DecisionId,
    error::{ErrorCode, ValidationError},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("decision {0} was not found")]
    NotFound(DecisionId),
    #[error("request to {url} failed with status {status}: {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response from backend: {0}")]
    UnexpectedResponse(String),
    #[error("invalid api base url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("invalid request header '{0}'")]
    InvalidHeader(String),
    #[error("failed to read evidence file '{path}': {source}")]
    ReadEvidence {
        path: String,
        source: std::io::Error,
    },
}

impl ClientError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(err) => err.code(),
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::ReadEvidence { .. } | Self::InvalidBaseUrl { .. } | Self::InvalidHeader(_) => {
                ErrorCode::Validation
            }
            Self::Status { .. } | Self::Transport(_) | Self::UnexpectedResponse(_) => {
                ErrorCode::Network
            }
        }
    }

    pub fn is_validation(&self) -> bool {
        self.code() == ErrorCode::Validation
    }
}
