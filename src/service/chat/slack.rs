//! Chat service integration for jira-bot.
//!
//! This module connects to Slack in socket mode:
//! - Receiving message events and turning them into [`ChatEvent`]s
//! - Posting replies, either as plain text or with attachment fields
//! - Reporting rejected credentials so the bot can shut down

use crate::base::{
    config::Config,
    types::{ChatEvent, InboundMessage, ReplyPayload, ReplyStyle, Res, Void},
};
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::{errors::SlackClientError, prelude::*};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, instrument, warn};

use std::sync::Arc;

use super::{ChatClient, GenericChatClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

/// Slack API error codes that mean the token will never work.
const INVALID_AUTH_CODES: &[&str] = &["invalid_auth", "not_authed", "account_inactive", "token_revoked", "token_expired"];

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub fn slack(config: &Config) -> Res<Self> {
        let client = SlackChatClient::new(config)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// User state for the slack socket client.
struct SlackUserState {
    events: mpsc::Sender<ChatEvent>,
}

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    app_token: SlackApiToken,
    bot_token: SlackApiToken,
    reply_style: ReplyStyle,
    client: Arc<FullClient>,
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        // Initialize tokens.

        let app_token = SlackApiToken::new(SlackApiTokenValue(config.slack_app_token.clone()));
        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_bot_token.clone()));

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        Ok(Self {
            app_token,
            bot_token,
            reply_style: config.reply_style,
            client,
        })
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    async fn start(&self, events: mpsc::Sender<ChatEvent>) -> Void {
        // Check the bot token before opening the socket.

        let session = self.client.open_session(&self.bot_token);

        match session.auth_test().await {
            Ok(bot_user) => info!("Slack bot user ID: {}", bot_user.user_id.0),
            Err(e) if is_invalid_auth(&e) => {
                events.send(ChatEvent::InvalidAuth).await?;
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }

        // Initialize the socket mode listener.

        let socket_mode_callbacks = SlackSocketModeListenerCallbacks::new()
            .with_command_events(handle_command_event)
            .with_interaction_events(handle_interaction_event)
            .with_push_events(handle_push_event);

        // Initialize the socket mode listener environment.

        let listener_environment = Arc::new(
            SlackClientEventsListenerEnvironment::new(self.client.clone())
                .with_error_handler(handle_listener_error)
                .with_user_state(SlackUserState { events: events.clone() }),
        );

        let socket_mode_listener = Arc::new(SlackClientSocketModeListener::new(
            &SlackClientSocketModeConfig::new(),
            listener_environment.clone(),
            socket_mode_callbacks,
        ));

        // Register an app token to listen for events,
        if let Err(e) = socket_mode_listener.listen_for(&self.app_token).await {
            if is_invalid_auth(&e) {
                events.send(ChatEvent::InvalidAuth).await?;
                return Ok(());
            }

            return Err(e.into());
        }

        // Start WS connections calling Slack API to get WS url for the token,
        // and wait for Ctrl-C to shutdown.
        socket_mode_listener.serve().await;

        Ok(())
    }

    #[instrument(skip(self, reply))]
    async fn send_reply(&self, channel_id: &str, reply: &ReplyPayload, username: &str) -> Void {
        let content = reply_content(reply, self.reply_style);

        let request = SlackApiChatPostMessageRequest::new(SlackChannelId(channel_id.to_string()), content).with_username(username.to_string());

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))?;

        Ok(())
    }
}

// Helpers.

/// Whether a Slack error means the token was rejected.
fn is_invalid_auth(error: &SlackClientError) -> bool {
    matches!(error, SlackClientError::ApiError(ae) if INVALID_AUTH_CODES.contains(&ae.code.as_str()))
}

/// Renders a reply as Slack message content.
fn reply_content(reply: &ReplyPayload, style: ReplyStyle) -> SlackMessageContent {
    let content = SlackMessageContent::new().with_text(reply.plain_text.clone());

    match style {
        ReplyStyle::Plain => content,
        ReplyStyle::Attachment => {
            let fields = reply
                .fields
                .iter()
                .map(|f| {
                    SlackMessageAttachmentFieldObject::new()
                        .with_title(f.title.clone())
                        .with_value(f.value.clone())
                        .with_short(f.short)
                })
                .collect();

            let attachment = SlackMessageAttachment::new().with_fields(fields).with_mrkdwn_in(vec!["fields".to_string()]);

            content.with_attachments(vec![attachment])
        }
    }
}

/// Converts a Slack message event into an [`InboundMessage`].
///
/// Events without a channel or text (edits, deletions, joins) yield `None`.
fn inbound_message(event: &SlackMessageEvent) -> Option<InboundMessage> {
    let channel_id = event.origin.channel.as_ref()?.0.clone();
    let text = event.content.as_ref().and_then(|c| c.text.clone())?;

    let sender = event
        .sender
        .username
        .clone()
        .or_else(|| event.sender.user.as_ref().map(|u| u.0.clone()))
        .unwrap_or_default();

    // Serialize the subtype to get its wire name, e.g. `bot_message`.
    let subtype = event
        .subtype
        .as_ref()
        .and_then(|s| serde_json::to_value(s).ok())
        .and_then(|v| v.as_str().map(str::to_string));

    Some(InboundMessage { sender, text, channel_id, subtype })
}

// Socket mode listener callbacks for Slack.

/// Handles command events from Slack.
async fn handle_command_event(
    event: SlackCommandEvent,
    _client: Arc<SlackHyperClient>,
    _states: SlackClientEventsUserState,
) -> Result<SlackCommandEventResponse, Box<dyn std::error::Error + Send + Sync>> {
    warn!("[COMMAND] {:#?}", event);
    Ok(SlackCommandEventResponse::new(SlackMessageContent::new().with_text("No app commands are currently supported.".into())))
}

/// Handles interaction events from Slack.
async fn handle_interaction_event(event: SlackInteractionEvent, _client: Arc<SlackHyperClient>, _states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    warn!("[INTERACTION] {:#?}", event);
    Ok(())
}

/// Handles push events from Slack.
#[instrument(skip_all)]
async fn handle_push_event(event_callback: SlackPushEventCallback, _client: Arc<SlackHyperClient>, states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let events = states
        .read()
        .await
        .get_user_state::<SlackUserState>()
        .map(|s| s.events.clone())
        .ok_or(anyhow::anyhow!("Failed to get user state"))?;

    match event_callback.event {
        SlackEventCallbackBody::Message(slack_message_event) => match inbound_message(&slack_message_event) {
            Some(message) => events.send(ChatEvent::Message(message)).await?,
            None => debug!("Skipping message event without channel or text."),
        },
        _ => {
            debug!("Received unhandled push event.")
        }
    }

    Ok(())
}

/// Forwards listener errors to the dispatcher.
fn handle_listener_error(err: Box<dyn std::error::Error + Send + Sync>, _client: Arc<SlackHyperClient>, states: SlackClientEventsUserState) -> HttpStatusCode {
    let event = listener_event(err.as_ref());

    if let Ok(states) = states.try_read()
        && let Some(user_state) = states.get_user_state::<SlackUserState>()
    {
        forward_event(&user_state.events, event);
    } else {
        warn!("Slack listener error: {}", err);
    }

    // Acknowledge the envelope so Slack does not redeliver it.
    HttpStatusCode::OK
}

/// Classifies a listener error; a revoked token mid-session is as fatal as one rejected at startup.
fn listener_event(err: &(dyn std::error::Error + Send + Sync + 'static)) -> ChatEvent {
    match err.downcast_ref::<SlackClientError>() {
        Some(e) if is_invalid_auth(e) => ChatEvent::InvalidAuth,
        _ => ChatEvent::TransportError(err.to_string()),
    }
}

/// Queues `event` without blocking the listener, logging it if the queue cannot take it.
///
/// Must be called within a tokio runtime.
fn forward_event(events: &mpsc::Sender<ChatEvent>, event: ChatEvent) {
    match events.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(ChatEvent::InvalidAuth)) => {
            // Must reach the dispatcher, so wait for room instead.
            let events = events.clone();
            tokio::spawn(async move { events.send(ChatEvent::InvalidAuth).await });
        }
        Err(TrySendError::Full(event)) => warn!("Event queue is full, dropping {:?}", event),
        Err(TrySendError::Closed(event)) => warn!("Event queue is closed, dropping {:?}", event),
    }
}

// Tests.
