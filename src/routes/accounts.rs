/// Account management endpoints
use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::models::Account;
use crate::services::account_service;

#[derive(Debug, Deserialize)]
pub struct AddAccountRequest {
    pub email: String,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "imapHost")]
    pub imap_host: Option<String>,
    #[serde(rename = "imapPort")]
    pub imap_port: Option<u16>,
    #[serde(rename = "imapUsername")]
    pub imap_username: Option<String>,
    #[serde(rename = "imapPassword")]
    pub imap_password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: String,
    pub user_id: String,
    pub email: String,
    pub imap_host: String,
    pub imap_port: u16,
    pub is_active: bool,
    pub last_sync_at: Option<String>,
    pub created_at: String,
}

impl From<Account> for AccountResponse {
    fn from(acc: Account) -> Self {
        Self {
            id: acc.id,
            user_id: acc.user_id,
            email: acc.email,
            imap_host: acc.imap_host,
            imap_port: acc.imap_port,
            is_active: acc.is_active,
            last_sync_at: acc.last_sync_at,
            created_at: acc.created_at,
        }
    }
}

/// POST /accounts - Add a new email account
pub async fn add_account(
    State(pool): State<SqlitePool>,
    Json(req): Json<AddAccountRequest>,
) -> Result<Json<AccountResponse>, (StatusCode, Json<serde_json::Value>)> {
    if req.email.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "email is required" })),
        ));
    }

    match account_service::add_account(
        &pool,
        &req.email,
        req.user_id.as_deref().unwrap_or("local"),
        req.imap_host,
        req.imap_port,
        req.imap_username,
        req.imap_password,
    )
    .await
    {
        Ok(account) => {
            tracing::info!("Account added: {}", account.email);
            Ok(Json(account.into()))
        }
        Err(e) => {
            tracing::error!("Failed to add account: {}", e);
            Err((
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": e.to_string() })),
            ))
        }
    }
}

/// GET /accounts - List all accounts
pub async fn list_accounts(
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<AccountResponse>>, StatusCode> {
    match account_service::list_accounts(&pool).await {
        Ok(accounts) => {
            let response: Vec<AccountResponse> = accounts.into_iter().map(Into::into).collect();
            Ok(Json(response))
        }
        Err(e) => {
            tracing::error!("Failed to list accounts: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
