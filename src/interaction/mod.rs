//! Event handling and user interactions for jira-bot.
//!
//! This module provides functionality for handling chat events:
//! - Finding ticket mentions in message text
//! - Skipping messages posted by this or other bots
//! - Rendering ticket replies
//! - Running the dispatch loop that ties these to the tracker and chat services

pub mod dispatch;
pub mod extract;
pub mod format;
pub mod ignore;
