//! Mail-fetch seam. Ingestion only sees `MailSource`; the shipped
//! implementation fabricates a sample batch, and a real IMAP/POP client can
//! be substituted without touching the dedup/persist logic.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Account;

#[derive(Debug, Error)]
pub enum MailSourceError {
    #[error("fetch failed: {0}")]
    Fetch(String),
}

/// A candidate message as retrieved from the upstream mail system, before it
/// has a store identity.
#[derive(Debug, Clone)]
pub struct RawMessage {
    pub message_id: String,
    pub from_addr: String,
    pub to_addr: String,
    pub subject: String,
    pub body: String,
    pub folder: String,
    pub received_at: String,
}

#[async_trait]
pub trait MailSource: Send + Sync {
    /// Retrieve a batch of candidate messages for the account. Order of the
    /// returned batch is the order ingestion processes them in.
    async fn fetch_candidates(&self, account: &Account) -> Result<Vec<RawMessage>, MailSourceError>;
}

/// Stand-in for a real protocol client: fabricates the same six messages the
/// reference backend generated for every sync run.
pub struct SampleMailSource;

const SAMPLE_SUBJECTS: [&str; 6] = [
    "Re: Job Application - Software Engineer Position",
    "Great to connect! Let's schedule a call",
    "Not interested at this time",
    "Out of Office: Vacation until next week",
    "Special offer just for you!",
    "Your application has been reviewed",
];

const SAMPLE_BODIES: [&str; 6] = [
    "Thank you for applying. We'd love to discuss the position further.",
    "Hi! I'm interested in learning more about your product. When can we meet?",
    "Thank you for reaching out, but we're not looking for this right now.",
    "I'm currently out of the office and will respond when I return.",
    "Click here for an exclusive deal! Limited time only!!!",
    "We've reviewed your profile and would like to move forward with an interview.",
];

pub fn sample_batch(account: &Account) -> Vec<RawMessage> {
    let now = chrono::Utc::now();
    SAMPLE_SUBJECTS
        .iter()
        .zip(SAMPLE_BODIES.iter())
        .enumerate()
        .map(|(i, (subject, body))| RawMessage {
            message_id: format!("msg-{}-{}-{}", account.id, now.timestamp_millis(), i),
            from_addr: format!("sender{}@example.com", i),
            to_addr: account.email.clone(),
            subject: subject.to_string(),
            body: body.to_string(),
            folder: "INBOX".to_string(),
            received_at: (now - chrono::Duration::days(i as i64)).to_rfc3339(),
        })
        .collect()
}

#[async_trait]
impl MailSource for SampleMailSource {
    async fn fetch_candidates(&self, account: &Account) -> Result<Vec<RawMessage>, MailSourceError> {
        Ok(sample_batch(account))
    }
}
