pub mod jira;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::{
    error::LookupError,
    types::{IssueIdentifier, IssueRecord},
};

// Traits.

/// Generic issue tracker trait that clients must implement.
///
/// This trait defines the single read the bot needs from a tracker. Implementing it allows
/// different trackers to be used with the jira-bot, and lets tests stub lookups out.
#[async_trait]
pub trait GenericTrackerClient: Send + Sync + 'static {
    /// Fetch one issue by its key.
    ///
    /// Each call is a single attempt; implementations must not retry.
    async fn fetch_issue(&self, id: &IssueIdentifier) -> Result<IssueRecord, LookupError>;
}

// Structs.

/// Issue tracker client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct TrackerClient {
    inner: Arc<dyn GenericTrackerClient>,
}

impl Deref for TrackerClient {
    type Target = dyn GenericTrackerClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl TrackerClient {
    pub fn new(inner: Arc<dyn GenericTrackerClient>) -> Self {
        Self { inner }
    }
}
