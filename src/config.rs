use std::env;

/// Runtime configuration, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// OpenAI-compatible chat-completions endpoint used for classification.
    pub classifier_url: String,
    pub classifier_api_key: String,
    pub classifier_model: String,
    /// Chat-style sink (Slack incoming webhook).
    pub chat_webhook_url: String,
    /// Generic sink receiving the full event payload.
    pub webhook_url: String,
    /// Bound on every outbound HTTP call (classifier and sinks).
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://leadhub.db".into());
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3030);
        let classifier_url = env::var("CLASSIFIER_URL")
            .unwrap_or_else(|_| "https://ai.gateway.lovable.dev/v1/chat/completions".into());
        let classifier_api_key = env::var("CLASSIFIER_API_KEY").unwrap_or_default();
        let classifier_model =
            env::var("CLASSIFIER_MODEL").unwrap_or_else(|_| "google/gemini-2.5-flash".into());
        let chat_webhook_url = env::var("CHAT_WEBHOOK_URL")
            .unwrap_or_else(|_| "https://hooks.slack.com/services/YOUR/WEBHOOK/URL".into());
        let webhook_url =
            env::var("WEBHOOK_URL").unwrap_or_else(|_| "https://webhook.site/unique-id".into());
        let http_timeout_secs = env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Config {
            database_url,
            port,
            classifier_url,
            classifier_api_key,
            classifier_model,
            chat_webhook_url,
            webhook_url,
            http_timeout_secs,
        }
    }
}
