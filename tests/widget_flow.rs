use async_trait::async_trait;
use chrono::FixedOffset;
use companion_chat::chat_client::ChatTransport;
use companion_chat::config_service::WidgetConfig;
use companion_chat::timeline::LogNode;
use companion_chat::{
    drive_lines, handle_event, ChatReply, ChatView, ChatWidget, EmotionImages, HistoryRecord, InputEvent, Sender,
    SubmitOutcome, TranscriptView, WidgetError, WidgetResult,
};
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Mutex;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::task::LocalSet;

// ============================================================================
// FIXTURES
// ============================================================================

enum Scripted {
    Reply { reply: ChatReply, after: Duration },
    Status(u16),
    Malformed,
}

#[derive(Default)]
struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    sent: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            sent: Mutex::new(Vec::new()),
        }
    }

    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send(&self, message: &str) -> WidgetResult<ChatReply> {
        self.sent.lock().unwrap().push(message.to_string());
        let next = self.script.lock().unwrap().pop_front();

        match next {
            Some(Scripted::Reply { reply, after }) => {
                if !after.is_zero() {
                    tokio::time::sleep(after).await;
                }
                Ok(reply)
            }
            Some(Scripted::Status(code)) => Err(WidgetError::Status(code)),
            Some(Scripted::Malformed) | None => {
                Err(serde_json::from_str::<ChatReply>("{}").unwrap_err().into())
            }
        }
    }
}

fn reply(message: &str, emotion: Option<&str>, timestamp: Option<&str>) -> Scripted {
    Scripted::Reply {
        reply: ChatReply {
            message: message.to_string(),
            character_emotion: emotion.map(str::to_string),
            timestamp: timestamp.map(str::to_string),
            explanation: None,
        },
        after: Duration::ZERO,
    }
}

fn config(delay_ms: u64) -> WidgetConfig {
    WidgetConfig {
        reply_delay_ms: delay_ms,
        images: EmotionImages::new("/img/default.png")
            .with("happy", "/img/happy.png")
            .with("sad", "/img/sad.png"),
        ..WidgetConfig::default()
    }
}

fn widget(
    script: Vec<Scripted>,
    delay_ms: u64,
) -> ChatWidget<ScriptedTransport, TranscriptView, FixedOffset> {
    ChatWidget::with_timezone(
        ScriptedTransport::new(script),
        TranscriptView::with_image("/img/default.png"),
        &config(delay_ms),
        FixedOffset::east_opt(9 * 3600).unwrap(),
    )
}

// ============================================================================
// SUBMISSION
// ============================================================================

#[tokio::test]
async fn non_empty_input_renders_user_message_and_clears_input() {
    let widget = widget(vec![reply("hi there", Some("happy"), None)], 0);
    widget.view().set_input("  hello  ");

    let outcome = widget.send_message().await;

    assert_eq!(outcome, SubmitOutcome::Replied { emotion: Some("happy".to_string()) });
    assert_eq!(widget.view().input_text(), "");

    let view = widget.view();
    let messages = view.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, Sender::User);
    assert_eq!(messages[0].text, "hello");
    assert!(messages[0].time_label.is_some());
    assert_eq!(messages[1].sender, Sender::Bot);
    assert_eq!(messages[1].text, "hi there");
    assert!(view.is_scrolled_to_bottom());
    drop(view);

    assert_eq!(widget_sent(&widget), vec!["hello".to_string()]);
}

#[tokio::test]
async fn blank_input_is_ignored_without_side_effects() {
    let widget = widget(vec![], 0);
    widget.view().set_input(" \t  ");

    let outcome = widget.send_message().await;

    assert_eq!(outcome, SubmitOutcome::Ignored);
    assert!(widget.view().nodes().is_empty());
    assert_eq!(widget.view().input_text(), " \t  ");
    assert!(widget_sent(&widget).is_empty());
}

#[tokio::test(start_paused = true)]
async fn reply_is_rendered_after_the_display_delay() {
    let widget = widget(vec![reply("반가워!", Some("happy"), None)], 500);

    let midway = async {
        tokio::time::sleep(Duration::from_millis(499)).await;
        let view = widget.view();
        let count = view.messages().len();
        let image = view.character_image().map(str::to_string);
        (count, image)
    };
    let (outcome, (before_delay, image_before)) = tokio::join!(widget.submit("안녕"), midway);

    assert_eq!(outcome, SubmitOutcome::Replied { emotion: Some("happy".to_string()) });
    assert_eq!(before_delay, 1);
    assert_eq!(image_before.as_deref(), Some("/img/default.png"));
    assert_eq!(widget.view().messages().len(), 2);
    assert_eq!(widget.view().character_image(), Some("/img/happy.png"));
}

#[tokio::test]
async fn unknown_emotion_falls_back_to_default_image() {
    let widget = widget(
        vec![
            reply("good", Some("happy"), None),
            reply("hmm", Some("confused"), None),
        ],
        0,
    );

    widget.submit("first").await;
    assert_eq!(widget.view().character_image(), Some("/img/happy.png"));

    widget.submit("second").await;
    assert_eq!(widget.view().character_image(), Some("/img/default.png"));
}

#[tokio::test]
async fn server_timestamp_labels_the_reply() {
    let widget = widget(vec![reply("ok", None, Some("2024-05-01T10:00:00+00:00"))], 0);

    widget.submit("when?").await;

    let view = widget.view();
    let nodes = view.nodes();
    assert_eq!(
        nodes[nodes.len() - 2],
        LogNode::DateSeparator { label: "[2024년 5월 1일]".to_string() }
    );
    match nodes.last() {
        Some(LogNode::Message(block)) => {
            assert_eq!(block.sender, Sender::Bot);
            assert_eq!(block.time_label.as_deref(), Some("(19:00)"));
        }
        other => panic!("unexpected node {:?}", other),
    }
}

// ============================================================================
// FAILURES
// ============================================================================

#[tokio::test]
async fn http_error_renders_one_apology_and_sad_image() {
    let widget = widget(vec![Scripted::Status(500)], 500);

    let outcome = widget.submit("are you there?").await;

    assert_eq!(outcome, SubmitOutcome::Failed);
    let view = widget.view();
    let messages = view.messages();
    assert_eq!(messages.len(), 2);
    // The optimistic user message stays
    assert_eq!(messages[0].sender, Sender::User);
    assert_eq!(messages[0].text, "are you there?");
    assert_eq!(messages[1].sender, Sender::Bot);
    assert_eq!(messages[1].text, "죄송합니다. 메시지를 처리하는 데 문제가 발생했습니다.");
    assert!(messages[1].time_label.is_some());
    assert_eq!(view.character_image(), Some("/img/sad.png"));
}

#[tokio::test]
async fn malformed_reply_is_handled_like_an_http_error() {
    let widget = widget(vec![Scripted::Malformed], 0);

    let outcome = widget.submit("hello").await;

    assert_eq!(outcome, SubmitOutcome::Failed);
    assert_eq!(widget.view().messages().len(), 2);
    assert_eq!(widget.view().character_image(), Some("/img/sad.png"));
}

#[tokio::test]
async fn widget_keeps_working_after_a_failure() {
    let widget = widget(vec![Scripted::Status(502), reply("back!", Some("happy"), None)], 0);

    assert_eq!(widget.submit("one").await, SubmitOutcome::Failed);
    assert!(matches!(widget.submit("two").await, SubmitOutcome::Replied { .. }));

    let texts: Vec<String> = widget.view().messages().iter().map(|m| m.text.clone()).collect();
    assert_eq!(texts[2], "two");
    assert_eq!(texts[3], "back!");
    assert_eq!(widget.view().character_image(), Some("/img/happy.png"));
}

// ============================================================================
// CONCURRENCY
// ============================================================================

#[tokio::test(start_paused = true)]
async fn overlapping_submissions_render_in_completion_order() {
    let slow = Scripted::Reply {
        reply: ChatReply {
            message: "slow reply".to_string(),
            character_emotion: None,
            timestamp: None,
            explanation: None,
        },
        after: Duration::from_millis(300),
    };
    let fast = Scripted::Reply {
        reply: ChatReply {
            message: "fast reply".to_string(),
            character_emotion: None,
            timestamp: None,
            explanation: None,
        },
        after: Duration::from_millis(100),
    };
    let widget = widget(vec![slow, fast], 0);

    let (a, b) = futures::join!(widget.submit("first"), widget.submit("second"));
    assert!(matches!(a, SubmitOutcome::Replied { .. }));
    assert!(matches!(b, SubmitOutcome::Replied { .. }));

    let texts: Vec<String> = widget.view().messages().iter().map(|m| m.text.clone()).collect();
    assert_eq!(texts, vec!["first", "second", "fast reply", "slow reply"]);
}

#[tokio::test]
async fn submission_takes_the_input_at_call_time() {
    let widget = widget(vec![reply("a", None, None), reply("b", None, None)], 0);

    widget.view().set_input("one");
    let first = widget.send_message();
    widget.view().set_input("two");
    let second = widget.send_message();

    // Both user messages are on screen before either request runs
    let texts: Vec<String> = widget.view().messages().iter().map(|m| m.text.clone()).collect();
    assert_eq!(texts, vec!["one", "two"]);
    assert_eq!(widget.view().input_text(), "");

    let (a, b) = futures::join!(first, second);
    assert!(matches!(a, SubmitOutcome::Replied { .. }));
    assert!(matches!(b, SubmitOutcome::Replied { .. }));
    assert_eq!(widget_sent(&widget), vec!["one".to_string(), "two".to_string()]);
}

// ============================================================================
// CONSOLE
// ============================================================================

#[tokio::test]
async fn console_lines_become_user_messages_in_order() {
    let widget = Rc::new(widget(
        vec![
            reply("r1", None, None),
            reply("r2", None, None),
            reply("r3", None, None),
        ],
        0,
    ));
    let input: &[u8] = b"first\nsecond\nthird\n";

    let outcomes = LocalSet::new()
        .run_until(drive_lines(Rc::clone(&widget), BufReader::new(input)))
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes.iter().all(|o| matches!(o, SubmitOutcome::Replied { .. })));

    let user_texts: Vec<String> = widget
        .view()
        .messages()
        .iter()
        .filter(|m| m.sender == Sender::User)
        .map(|m| m.text.clone())
        .collect();
    assert_eq!(user_texts, vec!["first", "second", "third"]);
    assert_eq!(widget.view().messages().len(), 6);
    assert_eq!(widget_sent(&widget), vec!["first", "second", "third"]);
}

#[tokio::test]
async fn console_blank_lines_are_ignored() {
    let widget = Rc::new(widget(vec![reply("ok", None, None)], 0));
    let input: &[u8] = b"  \nhello\n\n";

    let outcomes = LocalSet::new()
        .run_until(drive_lines(Rc::clone(&widget), BufReader::new(input)))
        .await
        .unwrap();

    assert_eq!(outcomes[0], SubmitOutcome::Ignored);
    assert!(matches!(outcomes[1], SubmitOutcome::Replied { .. }));
    assert_eq!(outcomes[2], SubmitOutcome::Ignored);
    assert_eq!(widget_sent(&widget), vec!["hello"]);
    assert_eq!(widget.view().messages().len(), 2);
}

// ============================================================================
// EVENTS & HISTORY
// ============================================================================

#[tokio::test]
async fn only_click_and_plain_enter_submit() {
    let widget = widget(vec![reply("a", None, None), reply("b", None, None)], 0);

    widget.view().set_input("typed");
    let shift_enter = InputEvent::KeyPress { key: "Enter".to_string(), shift: true };
    assert_eq!(handle_event(&widget, &shift_enter).await, None);
    assert!(widget.view().nodes().is_empty());

    assert!(handle_event(&widget, &InputEvent::enter()).await.is_some());
    widget.view().set_input("clicked");
    assert!(handle_event(&widget, &InputEvent::Click).await.is_some());

    assert_eq!(widget_sent(&widget), vec!["typed".to_string(), "clicked".to_string()]);
}

#[tokio::test]
async fn history_replay_keeps_order_and_groups_by_day() {
    let widget = widget(vec![], 0);
    let history: Vec<HistoryRecord> = serde_json::from_str(
        r#"[
            {"is_user": true,  "message": "어제 안녕", "timestamp": "2024-05-01T01:00:00Z"},
            {"is_user": false, "message": "안녕하세요", "timestamp": "2024-05-01T01:00:05Z"},
            {"is_user": true,  "message": "오늘 또 왔어", "timestamp": "2024-05-02T01:00:00Z"}
        ]"#,
    )
    .unwrap();

    widget.replay_history(&history);

    let view = widget.view();
    assert_eq!(view.separators(), vec!["[2024년 5월 1일]", "[2024년 5월 2일]"]);

    let messages = view.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(
        messages.iter().map(|m| m.sender).collect::<Vec<_>>(),
        vec![Sender::User, Sender::Bot, Sender::User]
    );
    assert_eq!(messages[2].text, "오늘 또 왔어");

    // The day change sits between the second and third message
    assert!(matches!(view.nodes()[3], LogNode::DateSeparator { .. }));
}

#[tokio::test]
async fn empty_history_leaves_an_empty_log() {
    let widget = widget(vec![], 0);
    widget.replay_history(&[]);
    assert!(widget.view().nodes().is_empty());
    assert_eq!(widget.render_state().last_date(), None);
}

// ============================================================================
// HELPERS
// ============================================================================

fn widget_sent(widget: &ChatWidget<ScriptedTransport, TranscriptView, FixedOffset>) -> Vec<String> {
    widget.transport().sent()
}
