use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tag used for the failure image
pub const SAD: &str = "sad";

/// Tags the backend's emotion analysis can produce
pub const KNOWN_EMOTIONS: [&str; 5] = ["default", "happy", "sad", "angry", "mischievous"];

/// Emotion tag -> character image URL, with a mandatory default entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionImages {
    pub default: String,
    #[serde(flatten)]
    pub moods: BTreeMap<String, String>,
}

impl EmotionImages {
    pub fn new(default: &str) -> Self {
        Self {
            default: default.to_string(),
            moods: BTreeMap::new(),
        }
    }

    pub fn with(mut self, tag: &str, url: &str) -> Self {
        if tag == "default" {
            self.default = url.to_string();
        } else {
            self.moods.insert(tag.to_string(), url.to_string());
        }
        self
    }

    /// Image for an emotion tag. Unknown, missing and empty entries use the default.
    pub fn resolve(&self, tag: Option<&str>) -> &str {
        tag.and_then(|t| self.moods.get(t))
            .map(String::as_str)
            .filter(|url| !url.is_empty())
            .unwrap_or(&self.default)
    }

    pub fn sad(&self) -> &str {
        self.resolve(Some(SAD))
    }
}

impl Default for EmotionImages {
    fn default() -> Self {
        KNOWN_EMOTIONS
            .iter()
            .fold(EmotionImages::new(""), |images, tag| {
                images.with(tag, &format!("/static/images/{}.png", tag))
            })
    }
}
