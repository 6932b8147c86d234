//! The long-running loop that turns chat events into ticket replies.

use tokio::sync::mpsc;
use tracing::{Instrument, debug, error, info, info_span, instrument, warn};

use crate::{
    base::{
        config::Config,
        error::BotError,
        types::{BotIdentity, ChatEvent, InboundMessage, IssueIdentifier, Void},
    },
    service::{chat::ChatClient, tracker::TrackerClient},
};

use super::{extract::extract_issue_identifiers, format::format_reply, ignore::should_ignore};

/// Consumes chat events one at a time and replies to ticket mentions.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Dispatcher {
    identity: BotIdentity,
    base_url: String,
    tracker: TrackerClient,
    chat: ChatClient,
}

impl Dispatcher {
    pub fn new(config: &Config, tracker: TrackerClient, chat: ChatClient) -> Self {
        Self {
            identity: config.bot_identity(),
            base_url: config.jira_base_url.clone(),
            tracker,
            chat,
        }
    }

    /// Runs until the event stream closes or the transport reports a fatal error.
    ///
    /// Each message is handled to completion before the next event is read.
    pub async fn run(&self, mut events: mpsc::Receiver<ChatEvent>) -> Void {
        info!("Now listening for events ...");

        while let Some(event) = events.recv().await {
            self.handle_event(event).await?;
        }

        info!("Event stream closed.");

        Ok(())
    }

    /// Handles a single transport event.
    ///
    /// Only [`BotError::TransportFatal`] is ever returned; everything else is logged.
    pub async fn handle_event(&self, event: ChatEvent) -> Result<(), BotError> {
        match event {
            ChatEvent::Message(message) => {
                self.handle_message(&message).await;
            }
            ChatEvent::Latency(latency) => info!("Current latency: {:?}", latency),
            ChatEvent::TransportError(e) => warn!("{}", BotError::TransportTransient(e)),
            ChatEvent::InvalidAuth => {
                error!("Invalid Slack credentials.");
                return Err(BotError::TransportFatal("the chat transport rejected the bot's credentials".to_string()));
            }
        }

        Ok(())
    }

    /// Replies to every ticket mentioned in `message`, returning how many replies were sent.
    #[instrument(skip_all, fields(channel = %message.channel_id, sender = %message.sender))]
    pub async fn handle_message(&self, message: &InboundMessage) -> usize {
        if should_ignore(message, &self.identity) {
            debug!("Ignoring message.");
            return 0;
        }

        let mut sent = 0;

        for id in extract_issue_identifiers(&message.text) {
            info!("Identified {} in message.", id);

            let span = info_span!("mention", issue = %id);
            match self.respond_to_mention(&message.channel_id, &id).instrument(span).await {
                Ok(()) => sent += 1,
                Err(e) => error!("Failed responding to issue {}: {}", id, e),
            }
        }

        sent
    }

    /// Looks up one ticket and posts its summary; a single attempt, no retries.
    async fn respond_to_mention(&self, channel_id: &str, id: &IssueIdentifier) -> Result<(), BotError> {
        let issue = self.tracker.fetch_issue(id).await?;
        let reply = format_reply(&issue, &self.base_url);

        self.chat.send_reply(channel_id, &reply, &self.identity.display_name).await.map_err(BotError::Send)
    }
}
