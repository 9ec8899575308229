use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::fmt;

/// Who a message belongs to. Only affects styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn from_is_user(is_user: bool) -> Self {
        if is_user { Sender::User } else { Sender::Bot }
    }

    /// CSS class for the message block, e.g. `user-message`
    pub fn css_class(&self) -> &'static str {
        match self {
            Sender::User => "user-message",
            Sender::Bot => "bot-message",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => f.write_str("user"),
            Sender::Bot => f.write_str("bot"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn user(text: &str, timestamp: Option<DateTime<Utc>>) -> Self {
        Self {
            sender: Sender::User,
            text: text.to_string(),
            timestamp,
        }
    }

    pub fn bot(text: &str, timestamp: Option<DateTime<Utc>>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.to_string(),
            timestamp,
        }
    }
}

/// One entry of the history the page seeds the widget with.
/// Timestamps stay raw here; they are resolved against the widget's timezone on replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(default)]
    pub is_user: bool,
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}
