//! # Matrix Transport
//!
//! Implements the `ChatTransport` trait for the Matrix protocol using `matrix_sdk`.
//! Bridges the sdk's callback-style event handlers and sync loop to the single
//! event stream the session manager consumes.

use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use matrix_sdk::event_handler::EventHandlerHandle;
use matrix_sdk::room::Room;
use matrix_sdk::ruma::events::relation::InReplyTo;
use matrix_sdk::ruma::events::room::member::{MembershipState, StrippedRoomMemberEvent};
use matrix_sdk::ruma::events::room::message::{
    MessageType, Relation, RoomMessageEventContent, SyncRoomMessageEvent,
};
use matrix_sdk::ruma::{EventId, RoomId};
use matrix_sdk::{Client, config::SyncSettings};
use std::convert::TryFrom;
use std::future::Future;
use std::sync::OnceLock;
use tokio::sync::{Mutex, mpsc};
use tokio::task::{AbortHandle, JoinError, JoinHandle};

use crate::domain::config::BotConfig;
use crate::domain::errors::TransportError;
use crate::domain::traits::{ChatTransport, EventStream};
use crate::domain::types::{ConversationKind, Credentials, Identity, Profile, RawEvent};

/// Handlers and sync task installed by `listen`, torn down by `close`.
struct Listener {
    handlers: Vec<EventHandlerHandle>,
    sync: AbortHandle,
}

pub struct MatrixTransport {
    client: OnceLock<Client>,
    listener: Mutex<Option<Listener>>,
    display_name: Option<String>,
    auto_join_invites: bool,
    skip_backlog: bool,
}

impl MatrixTransport {
    pub fn new(bot: &BotConfig, display_name: Option<String>) -> Self {
        Self {
            client: OnceLock::new(),
            listener: Mutex::new(None),
            display_name,
            auto_join_invites: bot.auto_join_invites,
            skip_backlog: bot.skip_backlog,
        }
    }

    fn client(&self) -> Result<&Client, TransportError> {
        self.client
            .get()
            .ok_or_else(|| TransportError::Request("not logged in".to_string()))
    }
}

enum Next {
    Event(Option<RawEvent>),
    Stopped(String),
}

/// Yields queued events until the sync loop stops, then one `Disconnected`.
/// Events already queued when sync stops are still delivered first.
fn forward_events<F>(rx: mpsc::UnboundedReceiver<RawEvent>, stopped: F) -> EventStream
where
    F: Future<Output = String> + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut rx = rx;
        let mut stopped = Box::pin(stopped);
        loop {
            let next = tokio::select! {
                biased;
                event = rx.recv() => Next::Event(event),
                reason = &mut stopped => Next::Stopped(reason),
            };
            match next {
                Next::Event(Some(event)) => yield Ok(event),
                Next::Event(None) => {
                    yield Err(TransportError::Disconnected("event handler removed".to_string()));
                    break;
                }
                Next::Stopped(reason) => {
                    while let Ok(event) = rx.try_recv() {
                        yield Ok(event);
                    }
                    yield Err(TransportError::Disconnected(reason));
                    break;
                }
            }
        }
    };
    stream.boxed()
}

fn describe_sync_end(finished: Result<Result<(), matrix_sdk::Error>, JoinError>) -> String {
    match finished {
        Ok(Ok(())) => "sync loop ended".to_string(),
        Ok(Err(e)) => format!("sync failed: {e}"),
        Err(e) => format!("sync task stopped: {e}"),
    }
}

fn conversation_kind(room: &Room) -> ConversationKind {
    if room.joined_members_count() <= 2 {
        ConversationKind::Direct
    } else {
        ConversationKind::Group
    }
}

/// Maps a room message to a `RawEvent`. Redacted events and, when `since_ms`
/// is set, anything sent before it are dropped.
fn to_raw_event(ev: &SyncRoomMessageEvent, room: &Room, since_ms: Option<u64>) -> Option<RawEvent> {
    let original = ev.as_original()?;

    if let Some(since) = since_ms {
        let sent_at: u64 = ev.origin_server_ts().get().into();
        if sent_at < since {
            return None;
        }
    }

    let (text, body) = match &original.content.msgtype {
        MessageType::Text(content) => (Some(content.body.clone()), None),
        other => (None, Some(other.body().to_string())),
    };

    Some(RawEvent {
        message_id: original.event_id.to_string(),
        author_id: original.sender.to_string(),
        conversation_id: room.room_id().to_string(),
        conversation_kind: conversation_kind(room),
        text,
        body,
    })
}

#[async_trait]
impl ChatTransport for MatrixTransport {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Identity, TransportError> {
        let client = Client::builder()
            .homeserver_url(&credentials.homeserver)
            .build()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        client
            .matrix_auth()
            .login_username(&credentials.username, &credentials.password)
            .send()
            .await
            .map_err(|e| TransportError::Rejected(e.to_string()))?;

        let user_id = client
            .user_id()
            .map(|id| id.to_string())
            .unwrap_or_default();

        if let Some(name) = &self.display_name {
            tracing::info!("Setting display name to: {}", name);
            if let Err(e) = client.account().set_display_name(Some(name.as_str())).await {
                tracing::warn!("Failed to set display name: {}", e);
            }
        }

        self.client
            .set(client)
            .map_err(|_| TransportError::Request("already logged in".to_string()))?;

        Ok(Identity { user_id })
    }

    async fn listen(&self) -> Result<EventStream, TransportError> {
        let client = self.client()?;
        let mut listener = self.listener.lock().await;
        if listener.is_some() {
            return Err(TransportError::Request("already listening".to_string()));
        }

        let since_ms = self
            .skip_backlog
            .then(|| u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0));

        let (tx, rx) = mpsc::unbounded_channel::<RawEvent>();
        let mut handlers = vec![client.add_event_handler(
            move |ev: SyncRoomMessageEvent, room: Room| {
                let tx = tx.clone();
                async move {
                    if let Some(raw) = to_raw_event(&ev, &room, since_ms) {
                        let _ = tx.send(raw);
                    }
                }
            },
        )];

        if self.auto_join_invites {
            handlers.push(client.add_event_handler(
                |ev: StrippedRoomMemberEvent, room: Room, client: Client| async move {
                    let for_us = client.user_id().is_some_and(|id| id.as_str() == ev.state_key.as_str());
                    if for_us && ev.content.membership == MembershipState::Invite {
                        tracing::info!("Received invite for room {}", room.room_id());
                        if let Err(e) = room.join().await {
                            tracing::warn!("Failed to join room after invite: {}", e);
                        }
                    }
                },
            ));
        }

        let sync_client = client.clone();
        let sync: JoinHandle<Result<(), matrix_sdk::Error>> =
            tokio::spawn(async move { sync_client.sync(SyncSettings::default()).await });

        *listener = Some(Listener {
            handlers,
            sync: sync.abort_handle(),
        });

        Ok(forward_events(rx, async move {
            describe_sync_end(sync.await)
        }))
    }

    async fn send(
        &self,
        text: &str,
        conversation_id: &str,
        _kind: ConversationKind,
        reply_to: Option<&str>,
    ) -> Result<String, TransportError> {
        let client = self.client()?;
        let room_id = <&RoomId>::try_from(conversation_id)
            .map_err(|e| TransportError::InvalidId(format!("{conversation_id}: {e}")))?;
        let room = client
            .get_room(room_id)
            .ok_or_else(|| TransportError::UnknownConversation(conversation_id.to_string()))?;

        let mut content = RoomMessageEventContent::text_markdown(text);
        if let Some(reply_to) = reply_to {
            let event_id = <&EventId>::try_from(reply_to)
                .map_err(|e| TransportError::InvalidId(format!("{reply_to}: {e}")))?;
            content.relates_to = Some(Relation::Reply {
                in_reply_to: InReplyTo::new(event_id.to_owned()),
            });
        }

        room.send(content)
            .await
            .map(|resp| resp.event_id.to_string())
            .map_err(|e| TransportError::Request(e.to_string()))
    }

    /// Only the bot's own profile is resolved; other users yield `None`.
    async fn fetch_identity_info(&self, user_id: &str) -> Result<Option<Profile>, TransportError> {
        let client = self.client()?;
        let is_self = client.user_id().is_some_and(|id| id.as_str() == user_id);
        if !is_self {
            return Ok(None);
        }

        let display_name = client
            .account()
            .get_display_name()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(Some(Profile {
            user_id: user_id.to_string(),
            display_name,
        }))
    }

    async fn close(&self) -> Result<(), TransportError> {
        let Some(listener) = self.listener.lock().await.take() else {
            return Ok(());
        };

        listener.sync.abort();
        if let Some(client) = self.client.get() {
            for handle in listener.handlers {
                client.remove_event_handler(handle);
            }
        }
        tracing::info!("Stopped Matrix sync");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_sync_end_clean_exit() {
        assert_eq!(describe_sync_end(Ok(Ok(()))), "sync loop ended");
    }

    #[tokio::test]
    async fn test_requests_before_login_fail() {
        let transport = MatrixTransport::new(&BotConfig::default(), None);

        assert!(matches!(transport.listen().await, Err(TransportError::Request(_))));
        let err = transport
            .send("hi", "!room:example.org", ConversationKind::Direct, None)
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Request(_)));
        assert!(transport.fetch_identity_info("@bot:example.org").await.is_err());
    }

    fn raw(id: &str) -> RawEvent {
        RawEvent {
            message_id: id.to_string(),
            author_id: "@alice:example.org".to_string(),
            conversation_id: "!room:example.org".to_string(),
            conversation_kind: ConversationKind::Direct,
            text: Some("menu".to_string()),
            body: None,
        }
    }

    #[tokio::test]
    async fn test_queued_events_are_delivered_before_disconnect() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(raw("$1")).unwrap();
        tx.send(raw("$2")).unwrap();

        let items: Vec<_> = forward_events(rx, std::future::ready("sync failed: boom".to_string()))
            .collect()
            .await;

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap().message_id, "$1");
        assert_eq!(items[1].as_ref().unwrap().message_id, "$2");
        assert_eq!(
            items[2],
            Err(TransportError::Disconnected("sync failed: boom".to_string()))
        );
        drop(tx);
    }

    #[tokio::test]
    async fn test_dropped_handler_ends_stream() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(tx);

        let items: Vec<_> = forward_events(rx, std::future::pending::<String>())
            .collect()
            .await;

        assert_eq!(
            items,
            vec![Err(TransportError::Disconnected("event handler removed".to_string()))]
        );
    }

    #[tokio::test]
    async fn test_close_without_listen_is_noop() {
        let transport = MatrixTransport::new(&BotConfig::default(), None);
        assert!(transport.close().await.is_ok());
        assert!(transport.close().await.is_ok());
    }
}
