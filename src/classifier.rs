//! Client for the external classification service (an OpenAI-compatible
//! chat-completions gateway). Narrow contract: subject + body in, one label
//! string out. Parsing the label into the taxonomy is the caller's job.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const SYSTEM_PROMPT: &str = "You are an email categorization AI. Categorize emails into EXACTLY ONE of these categories:
- interested: Email shows interest or asks questions about the product/service
- meeting_booked: Email confirms a meeting or asks to schedule one
- not_interested: Email declines or shows no interest
- spam: Promotional, scam, or unsolicited emails
- out_of_office: Auto-reply messages indicating absence
- uncategorized: Doesn't fit other categories

Respond with ONLY the category name in lowercase.";

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("empty completion")]
    EmptyCompletion,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

pub struct ClassifierClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl ClassifierClient {
    pub fn new(
        endpoint: String,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, ClassifierError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClassifierError::Network(e.to_string()))?;
        Ok(Self {
            http,
            endpoint,
            api_key,
            model,
        })
    }

    /// Ask the gateway for a label. A timed-out call surfaces as a network
    /// error, identical to an unreachable service.
    pub async fn classify(&self, subject: &str, body: &str) -> Result<String, ClassifierError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("Subject: {}\n\nBody: {}", subject, body),
                },
            ],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClassifierError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Api(status.as_u16(), text));
        }

        let data: ChatResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Network(e.to_string()))?;

        let content = data
            .choices
            .first()
            .map(|c| c.message.content.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .ok_or(ClassifierError::EmptyCompletion)?;

        Ok(content)
    }
}
