use std::{fmt, time::Duration};

use serde::Deserialize;

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// The `subtype` Slack attaches to messages posted by integrations and other bots.
pub const BOT_MESSAGE_SUBTYPE: &str = "bot_message";

/// A ticket key such as `ABC-123`, always held in its ASCII upper-cased form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IssueIdentifier(String);

impl IssueIdentifier {
    /// Normalizes `raw` into an identifier.
    ///
    /// This does not validate the `KEY-NUMBER` shape; use the extractor for untrusted text.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IssueIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IssueIdentifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A message posted into a channel, as seen by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InboundMessage {
    /// Username (or user id, when no username is attached) of the poster.
    pub sender: String,
    pub text: String,
    pub channel_id: String,
    /// Wire name of the message subtype, e.g. `bot_message`.
    pub subtype: Option<String>,
}

/// The bot's own configured name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    pub display_name: String,
}

/// Ticket metadata returned by the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRecord {
    pub key: IssueIdentifier,
    pub summary: String,
    pub status_name: String,
    pub assignee_display_name: Option<String>,
    pub reporter_display_name: Option<String>,
}

/// A single `title: value` entry rendered under the reply text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyField {
    pub title: String,
    pub value: String,
    pub short: bool,
}

impl ReplyField {
    pub fn new(title: impl Into<String>, value: impl Into<String>, short: bool) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            short,
        }
    }
}

/// The formatted reply for one ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyPayload {
    pub plain_text: String,
    pub fields: Vec<ReplyField>,
}

/// How replies are presented in the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStyle {
    /// Only the single-line text.
    Plain,
    /// The single-line text as pretext, followed by the structured fields.
    #[default]
    Attachment,
}

/// Events surfaced by the chat transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// A message was posted to a channel the bot can see.
    Message(InboundMessage),
    /// Round-trip latency reported by the transport.
    Latency(Duration),
    /// A recoverable transport hiccup.
    TransportError(String),
    /// The transport rejected the bot's credentials.
    InvalidAuth,
}
