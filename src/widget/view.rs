use crate::services::timeline::{LogNode, MessageBlock};

/// The surface the widget draws on: log container, input field and
/// character image of the hosting page.
pub trait ChatView {
    fn append_node(&mut self, node: LogNode);
    fn scroll_to_bottom(&mut self);
    fn set_character_image(&mut self, url: &str);
    fn input_text(&self) -> String;
    /// Replace the input field's content, as typing would
    fn set_input(&mut self, text: &str);
    fn clear_input(&mut self);
}

/// In-memory view. Keeps every appended node so hosts can re-draw the log.
#[derive(Debug, Clone, Default)]
pub struct TranscriptView {
    nodes: Vec<LogNode>,
    input: String,
    character_image: Option<String>,
    // Node count at the last scroll; equal to nodes.len() when the log is at the bottom
    scrolled_to: usize,
}

impl TranscriptView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(url: &str) -> Self {
        Self {
            character_image: Some(url.to_string()),
            ..Self::default()
        }
    }

    pub fn nodes(&self) -> &[LogNode] {
        &self.nodes
    }

    pub fn messages(&self) -> Vec<&MessageBlock> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                LogNode::Message(block) => Some(block),
                LogNode::DateSeparator { .. } => None,
            })
            .collect()
    }

    pub fn separators(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                LogNode::DateSeparator { label } => Some(label.as_str()),
                LogNode::Message(_) => None,
            })
            .collect()
    }

    pub fn character_image(&self) -> Option<&str> {
        self.character_image.as_deref()
    }

    pub fn is_scrolled_to_bottom(&self) -> bool {
        self.scrolled_to == self.nodes.len()
    }
}

impl ChatView for TranscriptView {
    fn append_node(&mut self, node: LogNode) {
        self.nodes.push(node);
    }

    fn scroll_to_bottom(&mut self) {
        self.scrolled_to = self.nodes.len();
    }

    fn set_character_image(&mut self, url: &str) {
        self.character_image = Some(url.to_string());
    }

    fn input_text(&self) -> String {
        self.input.clone()
    }

    fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }
}
