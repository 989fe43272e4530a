//! # Log Strings
//!
//! Builders for log lines emitted more than once or from more than one place.

use crate::application::session::SessionStats;
use crate::domain::types::InboundEvent;

pub const STARTING: &str = "Starting menubot...";
pub const LISTEN_START: &str = "Start listening...";
pub const SHUTDOWN: &str = "Shutting down...";
pub const DRY_RUN: &str = "Auto reply disabled: replies will be logged, not sent";

pub fn config_loaded(path: &str, user: &str) -> String {
    format!("Loaded configuration from {path} for user: {user}")
}

pub fn logged_in(user_id: &str, display_name: &str) -> String {
    format!("Logged in as {display_name} ({user_id})")
}

pub fn logged_in_without_profile(user_id: &str) -> String {
    format!("Logged in ({user_id}) but no profile information was found")
}

pub fn profile_lookup_failed(err: &str) -> String {
    format!("Could not fetch own profile: {err}")
}

pub fn login_failed(err: &str) -> String {
    format!("Login failed: {err}")
}

pub fn received(event: &InboundEvent) -> String {
    format!(
        "Received message: mid={} author={} conversation={} text={:?}",
        event.message_id, event.author_id, event.conversation_id, event.raw_text
    )
}

pub fn ignored_command(normalized: &str) -> String {
    format!("Ignored invalid command: {normalized:?}")
}

pub fn dispatch_failed(event: &InboundEvent, err: &str) -> String {
    format!(
        "Failed to handle message: mid={} author={} conversation={} text={:?}: {err}",
        event.message_id, event.author_id, event.conversation_id, event.raw_text
    )
}

pub fn reply_suppressed(conversation_id: &str) -> String {
    format!("Auto reply disabled, not sending to {conversation_id}")
}

pub fn listen_failed(err: &str) -> String {
    format!("Error while listening: {err}")
}

pub fn shutdown_signal_fail(err: &str) -> String {
    format!("Unable to listen for shutdown signal: {err}")
}

pub fn close_failed(err: &str) -> String {
    format!("Failed to close transport: {err}")
}

pub fn session_summary(stats: &SessionStats, uptime_secs: i64) -> String {
    format!(
        "Listen loop finished after {uptime_secs}s: received={} handled={} ignored={} failed={}",
        stats.received, stats.handled, stats.ignored, stats.failed
    )
}
