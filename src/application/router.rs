//! # Command Router
//!
//! Validates a normalized message against the command whitelist, applies the
//! conversation state transition and runs the matching reply handler.
//!
//! | Command     | State                      | Reply                 |
//! |-------------|----------------------------|-----------------------|
//! | menu, help  | -> `AwaitingChoice`        | main menu             |
//! | 1           | unchanged                  | account info          |
//! | 2           | unchanged                  | usage guide           |
//! | 3           | unchanged                  | support contact       |
//! | exit        | entry removed              | exit confirmation     |
//!
//! Options 1-3 are accepted in any state, including before `menu`.

use crate::application::reply::ReplyEmitter;
use crate::application::state::ConversationStore;
use crate::domain::errors::DispatchError;
use crate::domain::types::{Command, ConversationState, InboundEvent};
use crate::strings::{logs, messages};

/// What happened to one event. Returned for counting and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Sent by the bot itself.
    SelfAuthored,
    /// Not a whitelisted command.
    Ignored,
    Handled(Command),
    /// The handler ran but its reply failed. State changes are kept.
    Failed(Command),
}

pub struct CommandRouter {
    self_id: String,
}

impl CommandRouter {
    pub fn new(self_id: impl Into<String>) -> Self {
        Self {
            self_id: self_id.into(),
        }
    }

    /// Handles one event end to end. Never returns an error; handler failures
    /// are logged with the event's ids and text.
    pub async fn dispatch(
        &self,
        event: &InboundEvent,
        store: &mut ConversationStore,
        replies: &ReplyEmitter,
    ) -> DispatchOutcome {
        if event.author_id == self.self_id {
            return DispatchOutcome::SelfAuthored;
        }

        let Some(command) = Command::from_normalized(&event.normalized_text) else {
            tracing::info!("{}", logs::ignored_command(&event.normalized_text));
            return DispatchOutcome::Ignored;
        };

        tracing::info!(
            "Router dispatching cmd='{}' conversation='{}' sender='{}'",
            command,
            event.conversation_id,
            event.author_id
        );

        match self.handle(command, event, store, replies).await {
            Ok(()) => DispatchOutcome::Handled(command),
            Err(e) => {
                tracing::error!("{}", logs::dispatch_failed(event, &e.to_string()));
                DispatchOutcome::Failed(command)
            }
        }
    }

    async fn handle(
        &self,
        command: Command,
        event: &InboundEvent,
        store: &mut ConversationStore,
        replies: &ReplyEmitter,
    ) -> Result<(), DispatchError> {
        let reply = match command {
            Command::Menu | Command::Help => {
                let previous = store.get(&event.conversation_id);
                store.set(&event.conversation_id, ConversationState::AwaitingChoice);
                tracing::debug!(
                    "Conversation {} state {:?} -> {:?}",
                    event.conversation_id,
                    previous,
                    ConversationState::AwaitingChoice
                );
                messages::MAIN_MENU.to_string()
            }
            Command::Option1 => messages::account_info(&event.author_id),
            Command::Option2 => messages::USAGE_GUIDE.to_string(),
            Command::Option3 => messages::SUPPORT_CONTACT.to_string(),
            Command::Exit => {
                if let Some(previous) = store.remove(&event.conversation_id) {
                    tracing::debug!("Conversation {} left state {:?}", event.conversation_id, previous);
                }
                messages::EXIT_CONFIRMATION.to_string()
            }
        };

        replies
            .send(
                &reply,
                &event.conversation_id,
                event.conversation_kind,
                Some(&event.message_id),
            )
            .await?;
        Ok(())
    }
}
