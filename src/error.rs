use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

use crate::classifier::ClassifierError;
use crate::mailsource::MailSourceError;

/// Errors a pipeline stage can surface to its invoker. Each stage is the
/// boundary of its own failure domain: these never unwind across stages.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Email not found: {0}")]
    MessageNotFound(String),

    #[error("Classification failed: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("Mail source error: {0}")]
    MailSource(#[from] MailSourceError),

    #[error("Database error: {0}")]
    Persistence(#[from] sqlx::Error),
}

impl PipelineError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::AccountNotFound(_) | Self::MessageNotFound(_) => StatusCode::NOT_FOUND,
            Self::Classifier(_) | Self::MailSource(_) => StatusCode::BAD_GATEWAY,
            Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
