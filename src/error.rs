// Error type shared by the transport, config and history loaders.
//
// Failures of a single submission never reach the user as a `WidgetError`;
// the controller turns them into the apology message. The enum exists so the
// services below it can use `?` and log a precise cause.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WidgetError {
    /// Filesystem failure while reading config or history files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport-level failure, including a reply body that is not valid JSON.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The chat endpoint answered with a non-success status.
    #[error("HTTP error! status: {0}")]
    Status(u16),

    /// The configured base URL or chat path does not form a valid URL.
    #[error("Invalid endpoint: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type WidgetResult<T> = Result<T, WidgetError>;

impl From<WidgetError> for String {
    fn from(e: WidgetError) -> Self {
        e.to_string()
    }
}
