//! Runtime services and shared state for the jira-bot.

use tokio::sync::mpsc;
use tracing::instrument;

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    interaction::dispatch::Dispatcher,
    service::{chat::ChatClient, tracker::TrackerClient},
};

/// Inbound events buffered between the transport and the dispatcher.
const EVENT_BUFFER: usize = 64;

/// Runtime service context that can be shared across the application.
///
/// This struct holds the tracker client, chat client, and configuration.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The issue tracker client instance.
    pub tracker: TrackerClient,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub fn new(config: Config) -> Res<Self> {
        // Initialize the tracker client.
        let tracker = TrackerClient::jira(&config)?;

        // Initialize the slack client.
        let chat = ChatClient::slack(&config)?;

        Ok(Self { config, tracker, chat })
    }

    /// Runs the transport in the background and dispatches its events until either side stops.
    pub async fn start(&self) -> Void {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        let chat = self.chat.clone();
        let transport = tokio::spawn(async move { chat.start(tx).await });

        let dispatcher = Dispatcher::new(&self.config, self.tracker.clone(), self.chat.clone());

        if let Err(e) = dispatcher.run(rx).await {
            transport.abort();
            return Err(e);
        }

        // The stream only closes once the transport has returned.
        transport.await?
    }
}
