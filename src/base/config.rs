//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use config::{ConfigBuilder, builder::DefaultState};
use serde::Deserialize;

use super::{
    error::BotError,
    types::{BotIdentity, ReplyStyle, Res},
};

/// Default name the bot posts under, and ignores messages from.
fn default_bot_username() -> String {
    "jirabot".to_string()
}

/// Default Jira REST API path.
fn default_jira_api_path() -> String {
    "/rest/api/2".to_string()
}

/// Default per-lookup timeout, in seconds.
fn default_jira_timeout_secs() -> u64 {
    10
}

/// Configuration for the jira-bot application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Name the bot posts as, and whose messages it ignores (`BOT_USERNAME`).
    #[serde(default = "default_bot_username")]
    pub bot_username: String,
    /// Slack app-level token for the socket mode connection (`SLACK_APP_TOKEN`).
    pub slack_app_token: String,
    /// Slack bot token used to post replies (`SLACK_BOT_TOKEN`).
    pub slack_bot_token: String,
    /// Base URL of the Jira installation (`JIRA_BASE_URL`).
    pub jira_base_url: String,
    /// Jira username (`JIRA_USERNAME`).
    pub jira_username: String,
    /// Jira password or API token (`JIRA_PASSWORD`).
    pub jira_password: String,
    /// REST API path appended to the base URL (`JIRA_API_PATH`).
    #[serde(default = "default_jira_api_path")]
    pub jira_api_path: String,
    /// Timeout for a single issue lookup, in seconds (`JIRA_TIMEOUT_SECS`).
    #[serde(default = "default_jira_timeout_secs")]
    pub jira_timeout_secs: u64,
    /// How replies are rendered: `plain` or `attachment` (`REPLY_STYLE`).
    #[serde(default)]
    pub reply_style: ReplyStyle,
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("JIRA_BOT"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        Self::from_builder(cfg)
    }

    /// Builds and validates the configuration from an already assembled set of sources.
    pub fn from_builder(cfg: ConfigBuilder<DefaultState>) -> Res<Self> {
        let mut inner: ConfigInner = cfg
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| BotError::Configuration(e.to_string()))?;

        let required = [
            ("slack_app_token", &inner.slack_app_token),
            ("slack_bot_token", &inner.slack_bot_token),
            ("jira_base_url", &inner.jira_base_url),
            ("jira_username", &inner.jira_username),
            ("jira_password", &inner.jira_password),
        ];

        if let Some((key, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(BotError::Configuration(format!("`{key}` must not be empty.")).into());
        }

        if inner.bot_username.trim().is_empty() {
            return Err(BotError::Configuration("`bot_username` must not be empty.".to_string()).into());
        }

        if inner.jira_timeout_secs < 1 || inner.jira_timeout_secs > 300 {
            return Err(BotError::Configuration("`jira_timeout_secs` must be between 1 and 300.".to_string()).into());
        }

        // Links are built as `{base}/browse/{key}`.
        inner.jira_base_url = inner.jira_base_url.trim_end_matches('/').to_string();

        Ok(Config { inner: Arc::new(inner) })
    }

    /// The identity the ignore policy compares senders against.
    pub fn bot_identity(&self) -> BotIdentity {
        BotIdentity {
            display_name: self.bot_username.clone(),
        }
    }
}
