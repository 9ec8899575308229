use async_trait::async_trait;
use reqwest::Client;
use url::Url;
use crate::error::{WidgetError, WidgetResult};
use crate::models::{ChatReply, ChatRequest};
use super::config_service::WidgetConfig;
use super::cookie_service::CookieJar;

/// Delivers one user message to the backend and returns its reply
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, message: &str) -> WidgetResult<ChatReply>;
}

/// HTTP client for the chat endpoint
pub struct ChatClient {
    client: Client,
    endpoint: Url,
    csrf_cookie: String,
    csrf_header: String,
    cookies: CookieJar,
}

impl ChatClient {
    pub fn new(
        base_url: &str,
        chat_path: &str,
        csrf_cookie: &str,
        csrf_header: &str,
        cookies: CookieJar,
    ) -> WidgetResult<Self> {
        let endpoint = Url::parse(base_url)?.join(chat_path)?;
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            endpoint,
            csrf_cookie: csrf_cookie.to_string(),
            csrf_header: csrf_header.to_string(),
            cookies,
        })
    }

    /// Create a client from the widget configuration
    pub fn from_config(config: &WidgetConfig) -> WidgetResult<Self> {
        let cookies = CookieJar::new(config.cookie.as_deref().unwrap_or_default());
        Self::new(
            &config.base_url,
            &config.chat_path,
            &config.csrf_cookie,
            &config.csrf_header,
            cookies,
        )
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for ChatClient {
    async fn send(&self, message: &str) -> WidgetResult<ChatReply> {
        let request = ChatRequest {
            message: message.to_string(),
        };

        let mut builder = self
            .client
            .post(self.endpoint.clone())
            .header("Content-Type", "application/json")
            .json(&request);

        match self.cookies.get(&self.csrf_cookie) {
            Some(token) => builder = builder.header(self.csrf_header.as_str(), token),
            None => log::warn!(
                "[chat-client] No '{}' cookie, sending without {}",
                self.csrf_cookie,
                self.csrf_header
            ),
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            return Err(WidgetError::Status(response.status().as_u16()));
        }

        let reply: ChatReply = response.json().await?;
        if let Some(explanation) = reply.explanation.as_deref().filter(|e| !e.is_empty()) {
            log::debug!("[chat-client] Reply explanation: {}", explanation);
        }

        Ok(reply)
    }
}
