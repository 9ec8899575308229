use chrono::TimeZone;
use std::future::Future;
use crate::services::chat_client::ChatTransport;
use crate::widget::{ChatView, ChatWidget, SubmitOutcome};

/// UI events the widget listens to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Send button clicked
    Click,
    /// Key pressed while the input field has focus
    KeyPress { key: String, shift: bool },
}

impl InputEvent {
    pub fn enter() -> Self {
        InputEvent::KeyPress {
            key: "Enter".to_string(),
            shift: false,
        }
    }

    /// Click and plain Enter submit; Shift+Enter and other keys don't
    pub fn triggers_submit(&self) -> bool {
        match self {
            InputEvent::Click => true,
            InputEvent::KeyPress { key, shift } => key == "Enter" && !shift,
        }
    }
}

/// Route a UI event to the submission flow.
/// Resolves to `None` when the event is not a submit trigger. Like
/// `send_message`, the input is consumed before the future is returned.
pub fn handle_event<'a, T, V, Tz>(
    widget: &'a ChatWidget<T, V, Tz>,
    event: &InputEvent,
) -> impl Future<Output = Option<SubmitOutcome>> + 'a
where
    T: ChatTransport,
    V: ChatView,
    Tz: TimeZone,
{
    let pending = event.triggers_submit().then(|| widget.send_message());
    async move {
        match pending {
            Some(submission) => Some(submission.await),
            None => None,
        }
    }
}
