//! Decides which messages the bot should not respond to.

use crate::base::types::{BOT_MESSAGE_SUBTYPE, BotIdentity, InboundMessage};

/// Returns `true` for messages the bot posted itself, or that another integration posted.
///
/// Either case would otherwise let bots answer each other forever.
pub fn should_ignore(message: &InboundMessage, identity: &BotIdentity) -> bool {
    message.sender == identity.display_name || message.subtype.as_deref() == Some(BOT_MESSAGE_SUBTYPE)
}
