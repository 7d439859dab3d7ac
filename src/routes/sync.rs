use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::PipelineError;
use crate::services::ingest_service;

#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    #[serde(rename = "accountEmail")]
    pub account_email: String,
}

/// POST /sync - Run ingestion for one account
pub async fn sync_account(
    State(state): State<AppState>,
    Json(req): Json<SyncRequest>,
) -> Result<Json<Value>, PipelineError> {
    let count = ingest_service::ingest_account(&state, &req.account_email).await?;
    Ok(Json(json!({ "success": true, "count": count })))
}
