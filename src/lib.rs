//! Library root for `jira-bot`.
//!
//! Jira-bot watches Slack channels for Jira ticket keys (e.g. `ABC-123`) and answers each
//! mention with the ticket's summary, status, assignee, and a link to it:
//! - Ticket keys are matched case-insensitively and answered once per message
//! - Messages from the bot itself, or from other bots, are ignored
//! - A failed lookup is logged and skipped, so one bad key never silences the rest
//!
//! The bot integrates with Slack for chat and Jira for ticket data. The architecture is
//! built around extensible traits that allow for different implementations of each service.

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the jira-bot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with tracker and chat clients
/// - Starts the main event loop for processing messages
pub async fn start(config: Config) -> Void {
    info!("Starting jira-bot ...");

    // Start the crypto provider; a provider installed earlier in the process is fine.
    let _ = crypto::ring::default_provider().install_default();

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config)?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
