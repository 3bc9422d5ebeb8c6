//! Error modeling for page controllers.

use client_core::ClientError;
use shared::error::ErrorCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Validation,
    Transport,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    CreateDecision,
    Upload,
    RunAnalysis,
    Navigation,
}

pub fn category_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Validation => "Validation",
        UiErrorCategory::Transport => "Network",
        UiErrorCategory::NotFound => "Not found",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn new(
        category: UiErrorCategory,
        context: UiErrorContext,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            context,
            message: message.into(),
        }
    }

    pub fn from_client(context: UiErrorContext, err: &ClientError) -> Self {
        let category = match err.code() {
            ErrorCode::Validation => UiErrorCategory::Validation,
            ErrorCode::NotFound => UiErrorCategory::NotFound,
            ErrorCode::Network => UiErrorCategory::Transport,
        };
        Self::new(category, context, err.to_string())
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    /// One-line text for the page's error banner.
    pub fn banner(&self) -> String {
        match (self.category, self.context) {
            (UiErrorCategory::NotFound, UiErrorContext::Navigation) => {
                format!("Page not found: {}", self.message)
            }
            (UiErrorCategory::NotFound, _) => {
                "Decision not found; check the id and try again.".to_string()
            }
            (UiErrorCategory::Transport, UiErrorContext::Upload) => {
                format!("Upload failed: {}", self.message)
            }
            (UiErrorCategory::Transport, UiErrorContext::RunAnalysis) => {
                format!("Analysis failed: {}", self.message)
            }
            (category, _) => format!("{} error: {}", category_label(category), self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{domain::DecisionId, error::ValidationError};

    #[test]
    fn typed_client_errors_map_to_categories() {
        let not_found = UiError::from_client(
            UiErrorContext::RunAnalysis,
            &ClientError::NotFound(DecisionId(4)),
        );
        assert_eq!(not_found.category(), UiErrorCategory::NotFound);
        assert_eq!(
            not_found.banner(),
            "Decision not found; check the id and try again."
        );

        let rejected = UiError::from_client(
            UiErrorContext::Upload,
            &ValidationError::UnsupportedMediaType {
                filename: "notes.txt".into(),
                media_type: "text/plain".into(),
            }
            .into(),
        );
        assert_eq!(rejected.category(), UiErrorCategory::Validation);
        assert!(rejected.banner().starts_with("Validation error: "));

        let status = UiError::from_client(
            UiErrorContext::Upload,
            &ClientError::Status {
                url: "http://api/documents/upload".into(),
                status: 500,
                message: "disk full".into(),
            },
        );
        assert_eq!(status.category(), UiErrorCategory::Transport);
        assert!(status.banner().starts_with("Upload failed: "));
    }
}
