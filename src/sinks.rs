//! Outbound notification sinks: a chat webhook carrying a short summary and
//! a generic webhook carrying the full event payload. Deliveries never
//! return an error to the caller; the outcome is reported for auditing.

use serde_json::{json, Value};
use std::time::Duration;

use crate::models::{DeliveryStatus, Message};

/// Result of one delivery attempt to one sink.
#[derive(Debug, Clone)]
pub struct SinkOutcome {
    /// Endpoint identifier recorded in the audit trail.
    pub endpoint: String,
    pub status: DeliveryStatus,
    /// Response body on success, error text on failure.
    pub response: Option<String>,
}

pub struct SinkClient {
    http: reqwest::Client,
    chat_webhook_url: String,
    webhook_url: String,
}

impl SinkClient {
    pub fn new(
        chat_webhook_url: String,
        webhook_url: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            chat_webhook_url,
            webhook_url,
        })
    }

    /// Short structured summary for the chat channel.
    pub async fn deliver_chat(&self, message: &Message) -> SinkOutcome {
        self.post(&self.chat_webhook_url, &chat_payload(message)).await
    }

    /// Full event payload for the generic webhook.
    pub async fn deliver_generic(&self, message: &Message) -> SinkOutcome {
        self.post(&self.webhook_url, &generic_payload(message)).await
    }

    async fn post(&self, url: &str, payload: &Value) -> SinkOutcome {
        match self.http.post(url).json(payload).send().await {
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                if status.is_success() {
                    SinkOutcome {
                        endpoint: url.to_string(),
                        status: DeliveryStatus::Sent,
                        response: Some(body),
                    }
                } else {
                    SinkOutcome {
                        endpoint: url.to_string(),
                        status: DeliveryStatus::Failed,
                        response: Some(format!("HTTP {}: {}", status.as_u16(), body)),
                    }
                }
            }
            Err(e) => SinkOutcome {
                endpoint: url.to_string(),
                status: DeliveryStatus::Failed,
                response: Some(e.to_string()),
            },
        }
    }
}

/// Slack block-kit summary: header plus from/subject fields and a body
/// preview capped at 200 characters.
pub fn chat_payload(message: &Message) -> Value {
    let preview: String = message.body.chars().take(200).collect();
    json!({
        "text": "New Interested Email!",
        "blocks": [
            {
                "type": "header",
                "text": { "type": "plain_text", "text": "New Interested Lead" }
            },
            {
                "type": "section",
                "fields": [
                    { "type": "mrkdwn", "text": format!("*From:*\n{}", message.from_addr) },
                    { "type": "mrkdwn", "text": format!("*Subject:*\n{}", message.subject) }
                ]
            },
            {
                "type": "section",
                "text": { "type": "mrkdwn", "text": format!("*Message:*\n{}...", preview) }
            }
        ]
    })
}

pub fn generic_payload(message: &Message) -> Value {
    json!({
        "event": "email.interested",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "email": {
            "id": message.id,
            "from": message.from_addr,
            "subject": message.subject,
            "body": message.body,
            "category": message.category,
            "received_at": message.received_at,
        }
    })
}
