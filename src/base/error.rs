//! Error taxonomy for the bot.

use super::types::IssueIdentifier;

/// Errors that shape how the bot reacts: which ones end the process, and which ones
/// only cost a single reply.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Fatal transport error: {0}")]
    TransportFatal(String),

    #[error("Transport error: {0}")]
    TransportTransient(String),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Failed to send reply: {0}")]
    Send(#[source] anyhow::Error),
}

impl BotError {
    /// Process exit status for errors that end the bot.
    pub fn exit_code(&self) -> i32 {
        match self {
            BotError::TransportFatal(_) => 2,
            _ => 1,
        }
    }
}

/// Failures fetching a single ticket from the tracker.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Issue {0} does not exist")]
    NotFound(IssueIdentifier),

    #[error("Tracker rejected credentials (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("Tracker responded with HTTP {status}")]
    Status { status: u16 },

    #[error("Tracker request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Malformed tracker response: {0}")]
    Malformed(String),
}
