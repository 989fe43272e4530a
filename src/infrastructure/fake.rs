//! # In-Memory Transport
//!
//! Scripted `ChatTransport` used by the tests. Events are queued up front,
//! sends are recorded, and each failure mode can be switched on.

use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Mutex;

use crate::domain::errors::TransportError;
use crate::domain::traits::{ChatTransport, EventStream};
use crate::domain::types::{ConversationKind, Credentials, Identity, Profile, RawEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub text: String,
    pub conversation_id: String,
    pub kind: ConversationKind,
    pub reply_to: Option<String>,
}

#[derive(Default)]
struct Inner {
    script: Vec<Result<RawEvent, TransportError>>,
    sent: Vec<SentMessage>,
    reject_auth: bool,
    no_identity: bool,
    fail_sends: bool,
    fail_lookup: bool,
    display_name: Option<String>,
    listen_calls: usize,
    close_calls: usize,
}

pub struct FakeTransport {
    self_id: String,
    inner: Mutex<Inner>,
}

impl FakeTransport {
    pub fn new(self_id: &str) -> Self {
        Self {
            self_id: self_id.to_string(),
            inner: Mutex::new(Inner::default()),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let mut guard = self.inner.lock().unwrap();
        f(&mut guard)
    }

    pub fn push_message(&self, message_id: &str, author_id: &str, conversation_id: &str, text: &str) {
        let event = RawEvent {
            message_id: message_id.to_string(),
            author_id: author_id.to_string(),
            conversation_id: conversation_id.to_string(),
            conversation_kind: ConversationKind::Direct,
            text: Some(text.to_string()),
            body: None,
        };
        self.with(|i| i.script.push(Ok(event)));
    }

    pub fn push_disconnect(&self, reason: &str) {
        self.with(|i| {
            i.script
                .push(Err(TransportError::Disconnected(reason.to_string())))
        });
    }

    pub fn reject_auth(&self, reject: bool) {
        self.with(|i| i.reject_auth = reject);
    }

    pub fn return_no_identity(&self, none: bool) {
        self.with(|i| i.no_identity = none);
    }

    pub fn fail_sends(&self, fail: bool) {
        self.with(|i| i.fail_sends = fail);
    }

    pub fn fail_lookup(&self, fail: bool) {
        self.with(|i| i.fail_lookup = fail);
    }

    pub fn set_display_name(&self, name: &str) {
        self.with(|i| i.display_name = Some(name.to_string()));
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.with(|i| i.sent.clone())
    }

    pub fn listen_calls(&self) -> usize {
        self.with(|i| i.listen_calls)
    }

    pub fn close_calls(&self) -> usize {
        self.with(|i| i.close_calls)
    }
}

#[async_trait]
impl ChatTransport for FakeTransport {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Identity, TransportError> {
        self.with(|i| {
            if i.reject_auth {
                return Err(TransportError::Rejected(format!(
                    "invalid password for {}",
                    credentials.username
                )));
            }
            Ok(Identity {
                user_id: if i.no_identity {
                    String::new()
                } else {
                    self.self_id.clone()
                },
            })
        })
    }

    async fn listen(&self) -> Result<EventStream, TransportError> {
        let script = self.with(|i| {
            i.listen_calls += 1;
            std::mem::take(&mut i.script)
        });
        Ok(futures::stream::iter(script).boxed())
    }

    async fn send(
        &self,
        text: &str,
        conversation_id: &str,
        kind: ConversationKind,
        reply_to: Option<&str>,
    ) -> Result<String, TransportError> {
        self.with(|i| {
            if i.fail_sends {
                return Err(TransportError::Request("send refused".to_string()));
            }
            i.sent.push(SentMessage {
                text: text.to_string(),
                conversation_id: conversation_id.to_string(),
                kind,
                reply_to: reply_to.map(str::to_string),
            });
            Ok(format!("$sent{}", i.sent.len()))
        })
    }

    async fn fetch_identity_info(&self, user_id: &str) -> Result<Option<Profile>, TransportError> {
        self.with(|i| {
            if i.fail_lookup {
                return Err(TransportError::Request("profile unavailable".to_string()));
            }
            Ok(i.display_name.clone().map(|name| Profile {
                user_id: user_id.to_string(),
                display_name: Some(name),
            }))
        })
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.with(|i| i.close_calls += 1);
        Ok(())
    }
}
