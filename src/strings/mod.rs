//! # Strings Module
//!
//! Centralizes user-facing replies and recurring log lines.
//! Ensures consistency in messaging and easier localization/updates.

pub mod logs;
pub mod messages;
