pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::base::types::{ChatEvent, ReplyPayload, Void};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the core functionality for interacting with chat platforms
/// like Slack. Implementing this trait allows different chat services to be used
/// with the jira-bot.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Start the chat client listener.
    ///
    /// Connects to the chat platform and forwards everything it reports into `events`
    /// until the connection is shut down. Rejected credentials are reported as
    /// [`ChatEvent::InvalidAuth`] rather than as an error.
    async fn start(&self, events: mpsc::Sender<ChatEvent>) -> Void;

    /// Post a reply to a channel.
    ///
    /// `username` overrides the name the reply is shown under.
    async fn send_reply(&self, channel_id: &str, reply: &ReplyPayload, username: &str) -> Void;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
