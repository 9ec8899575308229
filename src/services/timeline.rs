use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use std::fmt;
use crate::models::{ChatMessage, Sender};

// ============================================================================
// LOG NODES
// ============================================================================

/// A rendered message: the text is kept verbatim and never parsed as markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBlock {
    pub sender: Sender,
    pub text: String,
    pub time_label: Option<String>,
}

impl MessageBlock {
    pub fn css_classes(&self) -> [&'static str; 2] {
        ["message", self.sender.css_class()]
    }
}

/// Anything that can be appended to the chat log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogNode {
    DateSeparator { label: String },
    Message(MessageBlock),
}

impl fmt::Display for LogNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogNode::DateSeparator { label } => write!(f, "{}", label),
            LogNode::Message(block) => {
                write!(f, "{}: {}", block.sender, block.text)?;
                if let Some(time) = &block.time_label {
                    write!(f, " {}", time)?;
                }
                Ok(())
            }
        }
    }
}

// ============================================================================
// RENDER STATE
// ============================================================================

/// Calendar date of the last rendered message that carried a timestamp
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderState {
    last_date: Option<NaiveDate>,
}

impl RenderState {
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.last_date
    }
}

// ============================================================================
// RENDERER
// ============================================================================

/// Turns messages into log nodes, grouping them by calendar day in `tz`
#[derive(Debug, Clone)]
pub struct Timeline<Tz: TimeZone> {
    tz: Tz,
}

impl<Tz: TimeZone> Timeline<Tz> {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    /// Separator for `timestamp` if it starts a new calendar day.
    /// Messages without a timestamp leave the state untouched.
    pub fn date_separator(
        &self,
        state: RenderState,
        timestamp: Option<&DateTime<Utc>>,
    ) -> (RenderState, Option<LogNode>) {
        let Some(timestamp) = timestamp else {
            return (state, None);
        };

        let date = timestamp.with_timezone(&self.tz).date_naive();
        if state.last_date == Some(date) {
            return (state, None);
        }

        let separator = LogNode::DateSeparator {
            label: format_date_label(date),
        };
        (RenderState { last_date: Some(date) }, Some(separator))
    }

    /// Nodes to append for one message, in order, plus the updated state
    pub fn render(&self, state: RenderState, message: &ChatMessage) -> (RenderState, Vec<LogNode>) {
        let (state, separator) = self.date_separator(state, message.timestamp.as_ref());

        let time_label = message
            .timestamp
            .as_ref()
            .map(|ts| format_time_label(&ts.with_timezone(&self.tz)));

        let mut nodes = Vec::with_capacity(2);
        nodes.extend(separator);
        nodes.push(LogNode::Message(MessageBlock {
            sender: message.sender,
            text: message.text.clone(),
            time_label,
        }));

        (state, nodes)
    }

    /// Parse a timestamp string as sent by the backend.
    /// RFC 3339 instants are taken as-is; naive date-times are read in this timeline's zone.
    pub fn parse_timestamp(&self, raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
            return Some(instant.with_timezone(&Utc));
        }

        // A naive value in a DST gap has no local instant and is dropped like garbage
        let local = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .and_then(|naive| self.tz.from_local_datetime(&naive).earliest());
        match local {
            Some(local) => Some(local.with_timezone(&Utc)),
            None => {
                log::warn!("[timeline] Ignoring unparseable timestamp: {:?}", raw);
                None
            }
        }
    }
}

/// `[2024년 3월 9일]`
pub fn format_date_label(date: NaiveDate) -> String {
    format!("[{}년 {}월 {}일]", date.year(), date.month(), date.day())
}

/// `(09:05)`, 24-hour, zero-padded
pub fn format_time_label<Tz: TimeZone>(time: &DateTime<Tz>) -> String {
    format!("({:02}:{:02})", time.hour(), time.minute())
}
