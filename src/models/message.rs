use serde::{Deserialize, Serialize};

/// Fixed classification taxonomy. The classifier response is parsed into this
/// enum; anything outside it must never reach the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Interested,
    MeetingBooked,
    NotInterested,
    Spam,
    OutOfOffice,
    #[default]
    Uncategorized,
}

impl Category {
    /// Parse a classifier reply. Case-insensitive; returns None for anything
    /// outside the taxonomy so the caller decides how to handle the violation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "interested" => Some(Self::Interested),
            "meeting_booked" => Some(Self::MeetingBooked),
            "not_interested" => Some(Self::NotInterested),
            "spam" => Some(Self::Spam),
            "out_of_office" => Some(Self::OutOfOffice),
            "uncategorized" => Some(Self::Uncategorized),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interested => "interested",
            Self::MeetingBooked => "meeting_booked",
            Self::NotInterested => "not_interested",
            Self::Spam => "spam",
            Self::OutOfOffice => "out_of_office",
            Self::Uncategorized => "uncategorized",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    pub account_id: String,
    pub user_id: String,
    pub message_id: String,
    pub from_addr: String,
    pub to_addr: String,
    pub subject: String,
    pub body: String,
    pub folder: String,
    pub received_at: String,
    pub is_read: bool,
    pub category: String,
    pub created_at: String,
    pub updated_at: String,
}
