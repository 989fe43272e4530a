//! # Domain Types
//!
//! Common data structures and enums used across the dispatch pipeline.

use std::fmt;

/// Login material handed to the transport. Opaque to the core.
#[derive(Clone)]
pub struct Credentials {
    pub homeserver: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("homeserver", &self.homeserver)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The account the transport authenticated as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub user_id: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationKind {
    Direct,
    Group,
}

impl fmt::Display for ConversationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationKind::Direct => write!(f, "direct"),
            ConversationKind::Group => write!(f, "group"),
        }
    }
}

/// A message as delivered by the transport, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub message_id: String,
    pub author_id: String,
    pub conversation_id: String,
    pub conversation_kind: ConversationKind,
    /// Primary text field (plain text messages).
    pub text: Option<String>,
    /// Secondary body field (any other message type).
    pub body: Option<String>,
}

/// Canonical form of one received message. Built once by the ingestor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub message_id: String,
    pub author_id: String,
    pub conversation_id: String,
    pub conversation_kind: ConversationKind,
    pub raw_text: String,
    pub normalized_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationState {
    #[default]
    None,
    AwaitingChoice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Menu,
    Help,
    Option1,
    Option2,
    Option3,
    Exit,
}

impl Command {
    /// Every accepted command, in menu order. `as_str` gives the input that selects it.
    pub const WHITELIST: [Command; 6] = [
        Command::Menu,
        Command::Option1,
        Command::Option2,
        Command::Option3,
        Command::Help,
        Command::Exit,
    ];

    /// Exact match against the whitelist. Expects already-normalized text.
    pub fn from_normalized(text: &str) -> Option<Self> {
        Self::WHITELIST.into_iter().find(|cmd| cmd.as_str() == text)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Menu => "menu",
            Command::Help => "help",
            Command::Option1 => "1",
            Command::Option2 => "2",
            Command::Option3 => "3",
            Command::Exit => "exit",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
