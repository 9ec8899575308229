use std::io::Write;
use std::rc::Rc;
use chrono::TimeZone;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use crate::error::WidgetResult;
use crate::services::chat_client::{ChatClient, ChatTransport};
use crate::services::config_service::WidgetConfig;
use crate::services::history_service;
use crate::services::timeline::LogNode;
use crate::widget::{ChatView, ChatWidget, SubmitOutcome};

/// Terminal stand-in for the page: the log goes to stdout, each stdin line
/// is typed into the input field followed by Enter.
#[derive(Debug, Default)]
pub struct ConsoleView {
    input: String,
}

impl ChatView for ConsoleView {
    fn append_node(&mut self, node: LogNode) {
        println!("{}", node);
    }

    fn scroll_to_bottom(&mut self) {
        if let Err(e) = std::io::stdout().flush() {
            log::warn!("[console] Failed to flush stdout: {}", e);
        }
    }

    fn set_character_image(&mut self, url: &str) {
        println!("  <character: {}>", url);
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

/// Run the widget against stdin/stdout until EOF.
/// Must be driven inside a `LocalSet`.
pub async fn run_console(config: WidgetConfig) -> WidgetResult<()> {
    let client = ChatClient::from_config(&config)?;
    log::info!("[console] Chatting with {}", client.endpoint());

    let widget = Rc::new(ChatWidget::new(client, ConsoleView::default(), &config));
    widget.view().set_character_image(config.images.resolve(None));

    if let Some(path) = &config.history_path {
        let records = history_service::load_history(path)?;
        widget.replay_history(&records);
    }

    let outcomes = drive_lines(widget, BufReader::new(tokio::io::stdin())).await?;
    let failed = outcomes.iter().filter(|o| **o == SubmitOutcome::Failed).count();
    log::info!("[console] Input closed after {} lines ({} failed)", outcomes.len(), failed);

    Ok(())
}

/// Type each line into the widget's input and press Enter.
///
/// The input is consumed before the next line is read, so lines that arrive
/// together are each submitted once and in order. Replies are awaited on
/// local tasks; a slow reply does not hold up later lines. Returns one
/// outcome per line, blank lines included as `Ignored`.
/// Must be driven inside a `LocalSet`.
pub async fn drive_lines<T, V, Tz, R>(
    widget: Rc<ChatWidget<T, V, Tz>>,
    reader: R,
) -> WidgetResult<Vec<SubmitOutcome>>
where
    T: ChatTransport + 'static,
    V: ChatView + 'static,
    Tz: TimeZone + 'static,
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut in_flight = Vec::new();

    while let Some(line) = lines.next_line().await? {
        widget.view().set_input(&line);

        let pending = match widget.begin_send() {
            Some(text) => text,
            None => {
                in_flight.push(None);
                continue;
            }
        };

        let widget = Rc::clone(&widget);
        in_flight.push(Some(tokio::task::spawn_local(async move {
            widget.deliver(pending).await
        })));
    }

    let mut outcomes = Vec::with_capacity(in_flight.len());
    for task in in_flight {
        let outcome = match task {
            None => SubmitOutcome::Ignored,
            Some(task) => match task.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::error!("[console] Submission task failed: {}", e);
                    SubmitOutcome::Failed
                }
            },
        };
        outcomes.push(outcome);
    }

    Ok(outcomes)
}
