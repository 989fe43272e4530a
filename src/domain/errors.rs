//! # Errors
//!
//! Failure taxonomy for the bot. Only `SessionError` ends a run; everything
//! else is contained where it happens and logged.

use thiserror::Error;

/// Failures reported by a `ChatTransport` implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("credentials rejected: {0}")]
    Rejected(String),
    #[error("connection lost: {0}")]
    Disconnected(String),
    #[error("unknown conversation: {0}")]
    UnknownConversation(String),
    #[error("invalid identifier: {0}")]
    InvalidId(String),
    #[error("transport request failed: {0}")]
    Request(String),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authentication rejected: {0}")]
    Rejected(#[source] TransportError),
    #[error("authentication returned no identity")]
    NoIdentity,
}

#[derive(Debug, Error)]
#[error("listen loop failed: {0}")]
pub struct ConnectionError(#[source] pub TransportError);

#[derive(Debug, Error)]
#[error("identity lookup for {user_id} failed: {source}")]
pub struct IdentityLookupError {
    pub user_id: String,
    #[source]
    pub source: TransportError,
}

#[derive(Debug, Error)]
#[error("failed to send reply to {conversation_id}: {source}")]
pub struct SendError {
    pub conversation_id: String,
    #[source]
    pub source: TransportError,
}

/// Failure while handling a single event. Never leaves the router.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Send(#[from] SendError),
}

/// Outcomes that terminate a run.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}
