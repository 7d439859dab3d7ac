use serde::{Deserialize, Serialize};

/// Outcome of a single sink delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }
}

/// Append-only audit record of one delivery attempt to one sink.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct NotificationRecord {
    pub id: i64,
    pub email_id: i64,
    pub webhook_url: String,
    pub status: String,
    pub response: Option<String>,
    pub created_at: String,
}
