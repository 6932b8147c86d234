//! Core components, types, and utilities for the jira-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - The error taxonomy that decides what is fatal and what is only logged.
//! - Common types and result handling.

pub mod config;
pub mod error;
pub mod types;
