use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::PipelineError;
use crate::services::classify_service;

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    /// Source message-identifier, not the store id.
    #[serde(rename = "emailId")]
    pub email_id: String,
}

/// POST /classify - Classify one message and persist the label
pub async fn classify_message(
    State(state): State<AppState>,
    Json(req): Json<ClassifyRequest>,
) -> Result<Json<Value>, PipelineError> {
    let category = classify_service::classify_message(&state, &req.email_id).await?;
    Ok(Json(json!({ "success": true, "category": category.as_str() })))
}
