use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::error::{WidgetError, WidgetResult};
use crate::models::EmotionImages;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_CHAT_PATH: &str = "/chat/";
pub const DEFAULT_CSRF_COOKIE: &str = "csrftoken";
pub const DEFAULT_CSRF_HEADER: &str = "X-CSRFToken";
pub const DEFAULT_REPLY_DELAY_MS: u64 = 500;
pub const DEFAULT_APOLOGY: &str = "죄송합니다. 메시지를 처리하는 데 문제가 발생했습니다.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WidgetConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_chat_path")]
    pub chat_path: String,
    #[serde(default = "default_csrf_cookie")]
    pub csrf_cookie: String,
    #[serde(default = "default_csrf_header")]
    pub csrf_header: String,
    /// Cookie string of the hosting document, e.g. `csrftoken=...; sessionid=...`
    #[serde(default)]
    pub cookie: Option<String>,
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,
    #[serde(default = "default_apology")]
    pub apology: String,
    #[serde(default)]
    pub images: EmotionImages,
    #[serde(default)]
    pub history_path: Option<PathBuf>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_chat_path() -> String {
    DEFAULT_CHAT_PATH.to_string()
}

fn default_csrf_cookie() -> String {
    DEFAULT_CSRF_COOKIE.to_string()
}

fn default_csrf_header() -> String {
    DEFAULT_CSRF_HEADER.to_string()
}

fn default_reply_delay_ms() -> u64 {
    DEFAULT_REPLY_DELAY_MS
}

fn default_apology() -> String {
    DEFAULT_APOLOGY.to_string()
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            chat_path: default_chat_path(),
            csrf_cookie: default_csrf_cookie(),
            csrf_header: default_csrf_header(),
            cookie: None,
            reply_delay_ms: default_reply_delay_ms(),
            apology: default_apology(),
            images: EmotionImages::default(),
            history_path: None,
        }
    }
}

impl WidgetConfig {
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }
}

pub fn get_app_data_dir() -> WidgetResult<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| WidgetError::Config("Could not find data directory".to_string()))?
        .join("CompanionChat");

    if !data_dir.exists() {
        fs::create_dir_all(&data_dir)?;
    }

    Ok(data_dir)
}

fn get_config_path() -> WidgetResult<PathBuf> {
    Ok(get_app_data_dir()?.join("config.json"))
}

pub fn load_config() -> WidgetResult<WidgetConfig> {
    load_config_from(&get_config_path()?)
}

pub fn save_config(config: &WidgetConfig) -> WidgetResult<()> {
    save_config_to(&get_config_path()?, config)
}

/// Read a config file; a missing file yields the defaults
pub fn load_config_from(path: &Path) -> WidgetResult<WidgetConfig> {
    if !path.exists() {
        return Ok(WidgetConfig::default());
    }

    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| WidgetError::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

pub fn save_config_to(path: &Path, config: &WidgetConfig) -> WidgetResult<()> {
    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}
