//! # Reply Emitter
//!
//! Sends bot replies through the transport, gated by the `auto_reply_enabled` switch.
//! When the switch is off, `send` does nothing and reports success, so the
//! caller's flow is identical in dry-run mode.

use std::sync::Arc;

use crate::domain::errors::SendError;
use crate::domain::traits::ChatTransport;
use crate::domain::types::ConversationKind;

#[derive(Clone)]
pub struct ReplyEmitter {
    transport: Arc<dyn ChatTransport>,
    auto_reply_enabled: bool,
}

impl ReplyEmitter {
    pub fn new(transport: Arc<dyn ChatTransport>, auto_reply_enabled: bool) -> Self {
        Self {
            transport,
            auto_reply_enabled,
        }
    }

    pub fn auto_reply_enabled(&self) -> bool {
        self.auto_reply_enabled
    }

    /// Transport failures are logged here and returned as `SendError`.
    pub async fn send(
        &self,
        text: &str,
        conversation_id: &str,
        kind: ConversationKind,
        in_reply_to: Option<&str>,
    ) -> Result<(), SendError> {
        if !self.auto_reply_enabled {
            tracing::debug!("{}", crate::strings::logs::reply_suppressed(conversation_id));
            return Ok(());
        }

        tracing::info!("Bot sending message to {} ({}): {}", conversation_id, kind, text);
        match self
            .transport
            .send(text, conversation_id, kind, in_reply_to)
            .await
        {
            Ok(message_id) => {
                tracing::debug!("Sent {} to {}", message_id, conversation_id);
                Ok(())
            }
            Err(source) => {
                tracing::warn!("Send to {} failed: {}", conversation_id, source);
                Err(SendError {
                    conversation_id: conversation_id.to_string(),
                    source,
                })
            }
        }
    }
}
