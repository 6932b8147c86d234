#![cfg(test)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use jira_bot::{
    base::{
        config::{Config, ConfigInner},
        error::{BotError, LookupError},
        types::{ChatEvent, InboundMessage, IssueIdentifier, IssueRecord, ReplyField, ReplyPayload, Void},
    },
    interaction::dispatch::Dispatcher,
    runtime::Runtime,
    service::{
        chat::{ChatClient, GenericChatClient},
        tracker::{GenericTrackerClient, TrackerClient},
    },
};
use mockall::mock;
use tokio::sync::mpsc;

// Mocks.

mock! {
    pub Chat {}

    #[async_trait]
    impl GenericChatClient for Chat {
        async fn start(&self, events: mpsc::Sender<ChatEvent>) -> Void;
        async fn send_reply(&self, channel_id: &str, reply: &ReplyPayload, username: &str) -> Void;
    }
}

mock! {
    pub Tracker {}

    #[async_trait]
    impl GenericTrackerClient for Tracker {
        async fn fetch_issue(&self, id: &IssueIdentifier) -> Result<IssueRecord, LookupError>;
    }
}

// Helpers.

type Sent = Arc<Mutex<Vec<(String, ReplyPayload, String)>>>;

fn test_config() -> Config {
    Config {
        inner: Arc::new(ConfigInner {
            bot_username: "jirabot".to_string(),
            slack_app_token: "xapp-test".to_string(),
            slack_bot_token: "xoxb-test".to_string(),
            jira_base_url: "https://jira.example.com".to_string(),
            jira_username: "test".to_string(),
            jira_password: "test".to_string(),
            jira_api_path: "/rest/api/2".to_string(),
            jira_timeout_secs: 10,
            ..Default::default()
        }),
    }
}

fn issue(key: &str, summary: &str) -> IssueRecord {
    IssueRecord {
        key: IssueIdentifier::new(key),
        summary: summary.to_string(),
        status_name: "Open".to_string(),
        assignee_display_name: None,
        reporter_display_name: None,
    }
}

fn message(sender: &str, text: &str) -> InboundMessage {
    InboundMessage {
        sender: sender.to_string(),
        text: text.to_string(),
        channel_id: "C01TEST".to_string(),
        subtype: None,
    }
}

/// A tracker that knows `ABC-123` and nothing else.
fn get_mock_tracker(expected_calls: usize) -> MockTracker {
    let mut mock = MockTracker::new();

    mock.expect_fetch_issue().times(expected_calls).returning(|id| match id.as_str() {
        "ABC-123" => Ok(issue("ABC-123", "Fix bug")),
        _ => Err(LookupError::NotFound(id.clone())),
    });

    mock
}

/// A chat client that records every reply it is asked to send.
fn get_recording_chat() -> (MockChat, Sent) {
    let sent: Sent = Arc::default();
    let mut mock = MockChat::new();

    let recorder = sent.clone();
    mock.expect_send_reply().returning(move |channel_id, reply, username| {
        recorder.lock().unwrap().push((channel_id.to_string(), reply.clone(), username.to_string()));
        Ok(())
    });

    (mock, sent)
}

fn dispatcher(tracker: MockTracker, chat: MockChat) -> Dispatcher {
    Dispatcher::new(&test_config(), TrackerClient::new(Arc::new(tracker)), ChatClient::new(Arc::new(chat)))
}

// Tests.

#[tokio::test]
async fn test_mention_produces_formatted_reply() {
    let (chat, sent) = get_recording_chat();
    let dispatcher = dispatcher(get_mock_tracker(1), chat);

    let replies = dispatcher.handle_message(&message("U54321", "please check ABC-123")).await;
    assert_eq!(replies, 1);

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);

    let (channel_id, reply, username) = &sent[0];
    assert_eq!(channel_id, "C01TEST");
    assert_eq!(username, "jirabot");
    assert!(reply.plain_text.contains("ABC-123"));
    assert!(reply.plain_text.contains("Fix bug"));
    assert!(reply.plain_text.contains("https://jira.example.com/browse/ABC-123"));
    assert_eq!(reply.fields, vec![ReplyField::new("Status", "Open", true), ReplyField::new("Assigned", "Nobody", true)]);
}

#[tokio::test]
async fn test_failed_lookup_does_not_abort_other_mentions() {
    let (chat, sent) = get_recording_chat();
    let dispatcher = dispatcher(get_mock_tracker(2), chat);

    let replies = dispatcher.handle_message(&message("U54321", "MISSING-9 is blocked on abc-123")).await;
    assert_eq!(replies, 1);

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.plain_text.contains("ABC-123"));
}

#[tokio::test]
async fn test_failed_send_does_not_abort_other_mentions() {
    let mut tracker = MockTracker::new();
    tracker.expect_fetch_issue().times(2).returning(|id| Ok(issue(id.as_str(), "Something")));

    let mut chat = MockChat::new();
    chat.expect_send_reply()
        .times(2)
        .returning(|_, reply, _| if reply.plain_text.contains("ABC-1") { Err(anyhow::anyhow!("channel_not_found")) } else { Ok(()) });

    let dispatcher = dispatcher(tracker, chat);

    let replies = dispatcher.handle_message(&message("U54321", "ABC-1 and DEF-2")).await;
    assert_eq!(replies, 1);
}

#[tokio::test]
async fn test_repeated_mentions_are_looked_up_once() {
    let (chat, sent) = get_recording_chat();
    let dispatcher = dispatcher(get_mock_tracker(1), chat);

    let replies = dispatcher.handle_message(&message("U54321", "ABC-123, abc-123 and aBc-123 again")).await;
    assert_eq!(replies, 1);
    assert_eq!(sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_ignored_messages_never_reach_the_tracker() {
    let (chat, sent) = get_recording_chat();
    let dispatcher = dispatcher(get_mock_tracker(0), chat);

    // From the bot itself.
    assert_eq!(dispatcher.handle_message(&message("jirabot", "*ABC-123*: Fix bug")).await, 0);

    // From another integration.
    let bot_message = InboundMessage {
        subtype: Some("bot_message".to_string()),
        ..message("otherbot", "ABC-123")
    };
    assert_eq!(dispatcher.handle_message(&bot_message).await, 0);

    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_run_survives_transient_events_until_stream_closes() {
    let (chat, sent) = get_recording_chat();
    let dispatcher = dispatcher(get_mock_tracker(2), chat);

    let (tx, rx) = mpsc::channel(8);
    tx.send(ChatEvent::Latency(std::time::Duration::from_millis(42))).await.unwrap();
    tx.send(ChatEvent::Message(message("U54321", "ABC-123"))).await.unwrap();
    tx.send(ChatEvent::TransportError("socket closed, reconnecting".to_string())).await.unwrap();
    tx.send(ChatEvent::Message(message("U54321", "NOPE-1"))).await.unwrap();
    drop(tx);

    dispatcher.run(rx).await.expect("loop should end cleanly when the stream closes");

    assert_eq!(sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_run_stops_on_invalid_credentials() {
    let (chat, _sent) = get_recording_chat();
    let dispatcher = dispatcher(get_mock_tracker(0), chat);

    let (tx, rx) = mpsc::channel(8);
    tx.send(ChatEvent::InvalidAuth).await.unwrap();
    tx.send(ChatEvent::Message(message("U54321", "ABC-123"))).await.unwrap();

    let err = dispatcher.run(rx).await.expect_err("invalid credentials are fatal");
    assert!(matches!(err.downcast_ref::<BotError>(), Some(BotError::TransportFatal(_))));
}

#[tokio::test]
async fn test_runtime_dispatches_transport_events() {
    let (mut chat, sent) = get_recording_chat();
    chat.expect_start().times(1).returning(|events| {
        events.try_send(ChatEvent::Message(message("U54321", "please check ABC-123")))?;
        Ok(())
    });

    let runtime = Runtime {
        config: test_config(),
        tracker: TrackerClient::new(Arc::new(get_mock_tracker(1))),
        chat: ChatClient::new(Arc::new(chat)),
    };

    runtime.start().await.expect("runtime should stop once the transport stops");

    assert_eq!(sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_runtime_exits_on_invalid_credentials() {
    let mut chat = MockChat::new();
    chat.expect_start().times(1).returning(|events| {
        events.try_send(ChatEvent::InvalidAuth)?;
        Ok(())
    });

    let runtime = Runtime {
        config: test_config(),
        tracker: TrackerClient::new(Arc::new(get_mock_tracker(0))),
        chat: ChatClient::new(Arc::new(chat)),
    };

    let err = runtime.start().await.expect_err("invalid credentials are fatal");
    let bot_error = err.downcast_ref::<BotError>().expect("a bot error");
    assert_eq!(bot_error.exit_code(), 2);
}
