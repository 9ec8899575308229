use chrono::{Local, TimeZone, Utc};
use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use std::future::Future;
use std::time::Duration;
use crate::models::{ChatMessage, ChatReply, EmotionImages, HistoryRecord, Sender};
use crate::services::chat_client::ChatTransport;
use crate::services::config_service::WidgetConfig;
use crate::services::timeline::{RenderState, Timeline};
use crate::error::WidgetError;
use super::view::ChatView;

/// How a single submission ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; nothing was rendered
    Ignored,
    /// The backend answered and the reply was rendered
    Replied { emotion: Option<String> },
    /// The request failed and the apology was rendered
    Failed,
}

// View and render state change together so separators stay consistent
// when several submissions complete close to each other.
struct Surface<V> {
    view: V,
    state: RenderState,
}

/// Chat widget controller.
///
/// Owns the render state for one log. The user's message is always shown
/// before the request is sent and is never removed, whatever the outcome.
/// Submissions are not serialized: if several are in flight their replies
/// are rendered in completion order.
pub struct ChatWidget<T, V, Tz = Local>
where
    T: ChatTransport,
    V: ChatView,
    Tz: TimeZone,
{
    transport: T,
    surface: Mutex<Surface<V>>,
    timeline: Timeline<Tz>,
    images: EmotionImages,
    reply_delay: Duration,
    apology: String,
}

impl<T: ChatTransport, V: ChatView> ChatWidget<T, V, Local> {
    pub fn new(transport: T, view: V, config: &WidgetConfig) -> Self {
        Self::with_timezone(transport, view, config, Local)
    }
}

impl<T, V, Tz> ChatWidget<T, V, Tz>
where
    T: ChatTransport,
    V: ChatView,
    Tz: TimeZone,
{
    /// Create a widget that groups and labels messages in `tz`
    pub fn with_timezone(transport: T, view: V, config: &WidgetConfig, tz: Tz) -> Self {
        Self {
            transport,
            surface: Mutex::new(Surface {
                view,
                state: RenderState::default(),
            }),
            timeline: Timeline::new(tz),
            images: config.images.clone(),
            reply_delay: config.reply_delay(),
            apology: config.apology.clone(),
        }
    }

    pub fn view(&self) -> MappedMutexGuard<'_, V> {
        MutexGuard::map(self.surface.lock(), |surface| &mut surface.view)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn render_state(&self) -> RenderState {
        self.surface.lock().state
    }

    // ========================================================================
    // RENDER
    // ========================================================================

    /// Append a message to the log, preceded by a date separator when it
    /// starts a new day, then scroll to the bottom.
    pub fn render(&self, message: &ChatMessage) {
        let mut surface = self.surface.lock();
        let (state, nodes) = self.timeline.render(surface.state, message);
        surface.state = state;

        for node in nodes {
            surface.view.append_node(node);
        }
        surface.view.scroll_to_bottom();
    }

    /// Render the seeded history in the order given
    pub fn replay_history(&self, records: &[HistoryRecord]) {
        for record in records {
            let timestamp = record
                .timestamp
                .as_deref()
                .and_then(|raw| self.timeline.parse_timestamp(raw));

            self.render(&ChatMessage {
                sender: Sender::from_is_user(record.is_user),
                text: record.message.clone(),
                timestamp,
            });
        }

        if !records.is_empty() {
            log::info!("[widget] Replayed {} history records", records.len());
        }
    }

    // ========================================================================
    // SUBMIT
    // ========================================================================

    /// Submit whatever is in the view's input field.
    /// The field is read and cleared before this returns, not when the future is first polled.
    pub fn send_message<'a>(&'a self) -> impl Future<Output = SubmitOutcome> + 'a {
        let input = self.view().input_text();
        self.submit(&input)
    }

    /// Send one message and render the reply, or the apology on failure.
    /// Never returns an error: every failure ends up in the log.
    ///
    /// The user's message is rendered and the input cleared synchronously, so
    /// submissions started back to back show up in the order they were made.
    pub fn submit<'a>(&'a self, input: &str) -> impl Future<Output = SubmitOutcome> + 'a {
        let pending = self.begin_submit(input);
        async move {
            match pending {
                Some(text) => self.deliver(text).await,
                None => SubmitOutcome::Ignored,
            }
        }
    }

    /// Read the input field and run the synchronous half of a submission
    pub fn begin_send(&self) -> Option<String> {
        let input = self.view().input_text();
        self.begin_submit(&input)
    }

    /// Trim, render the user's message and clear the input.
    /// Returns the text to deliver, or `None` for blank input.
    pub fn begin_submit(&self, input: &str) -> Option<String> {
        let text = input.trim();
        if text.is_empty() {
            log::debug!("[widget] Ignoring blank submission");
            return None;
        }

        // Shown right away and kept even if the request fails
        self.render(&ChatMessage::user(text, Some(Utc::now())));
        self.view().clear_input();

        Some(text.to_string())
    }

    /// Network half of a submission started with `begin_submit`
    pub async fn deliver(&self, text: String) -> SubmitOutcome {
        match self.transport.send(&text).await {
            Ok(reply) => self.show_reply(reply).await,
            Err(err) => {
                self.show_failure(&err);
                SubmitOutcome::Failed
            }
        }
    }

    async fn show_reply(&self, reply: ChatReply) -> SubmitOutcome {
        let timestamp = reply
            .timestamp
            .as_deref()
            .and_then(|raw| self.timeline.parse_timestamp(raw));

        tokio::time::sleep(self.reply_delay).await;

        self.render(&ChatMessage::bot(&reply.message, timestamp));
        let image = self.images.resolve(reply.character_emotion.as_deref());
        self.view().set_character_image(image);

        SubmitOutcome::Replied {
            emotion: reply.character_emotion,
        }
    }

    fn show_failure(&self, err: &WidgetError) {
        log::error!("[widget] Error sending message: {}", err);

        self.render(&ChatMessage::bot(&self.apology, Some(Utc::now())));
        self.view().set_character_image(self.images.sad());
    }
}
