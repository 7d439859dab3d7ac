/// Inbox read surface for the UI layer
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::db::queries;
use crate::events::ChangeFeed;

/// GET /messages/:id - Newest-first message list for an account
pub async fn get_messages(
    State(pool): State<SqlitePool>,
    Path(account_id): Path<String>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let messages = queries::list_messages(&pool, &account_id, 100)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(json!({
        "account_id": account_id,
        "count": messages.len(),
        "messages": messages,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ReadFlagRequest {
    pub read: bool,
}

/// PATCH /messages/:id/read - Read-flag update (UI-owned field)
pub async fn set_read_flag(
    State(pool): State<SqlitePool>,
    State(events): State<ChangeFeed>,
    Path(id): Path<i64>,
    Json(req): Json<ReadFlagRequest>,
) -> Result<Json<Value>, (StatusCode, String)> {
    queries::get_message(&pool, id)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Email not found".to_string()))?;

    queries::set_read(&pool, id, req.read)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    events.publish("messages", "update", id);

    Ok(Json(json!({ "success": true })))
}
