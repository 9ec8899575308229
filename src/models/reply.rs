use serde::{Deserialize, Serialize};

/// Body posted to the chat endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Body returned by the chat endpoint on success
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: String,
    #[serde(default)]
    pub character_emotion: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Reasoning the backend attaches to a reply. Never displayed.
    #[serde(default)]
    pub explanation: Option<String>,
}
