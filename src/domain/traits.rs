//! # Domain Traits
//!
//! Abstract interface for the chat platform connection.
//! Allows the Matrix implementation in the Infrastructure layer to be swapped
//! for an in-memory transport in tests.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::domain::errors::TransportError;
use crate::domain::types::{ConversationKind, Credentials, Identity, Profile, RawEvent};

/// Inbound message stream. An `Err` item means the connection dropped and is
/// always the last item.
pub type EventStream = BoxStream<'static, Result<RawEvent, TransportError>>;

/// Abstract interface for a chat transport (e.g., Matrix)
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Log in and report who we are.
    async fn authenticate(&self, credentials: &Credentials) -> Result<Identity, TransportError>;

    /// Start receiving messages. Can only be called once per session.
    async fn listen(&self) -> Result<EventStream, TransportError>;

    /// Send a text message, optionally as a reply. Returns the new message id.
    async fn send(
        &self,
        text: &str,
        conversation_id: &str,
        kind: ConversationKind,
        reply_to: Option<&str>,
    ) -> Result<String, TransportError>;

    /// Look up profile information for a user id.
    async fn fetch_identity_info(&self, user_id: &str) -> Result<Option<Profile>, TransportError>;

    /// Release the connection. Calling it again is a no-op.
    async fn close(&self) -> Result<(), TransportError>;
}
