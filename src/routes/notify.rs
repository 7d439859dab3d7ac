use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::PipelineError;
use crate::services::notify_service;

#[derive(Debug, Deserialize)]
pub struct NotifyRequest {
    /// Store id of the message, as a string on the wire.
    #[serde(rename = "emailId")]
    pub email_id: String,
}

/// POST /notify - Deliver an interested message to the configured sinks
pub async fn notify_message(
    State(state): State<AppState>,
    Json(req): Json<NotifyRequest>,
) -> Result<Json<Value>, PipelineError> {
    // An id that does not parse cannot name any stored message.
    let email_id: i64 = req
        .email_id
        .parse()
        .map_err(|_| PipelineError::MessageNotFound(req.email_id.clone()))?;
    notify_service::notify_message(&state, email_id).await?;
    Ok(Json(json!({ "success": true })))
}
