//! # Session Manager
//!
//! Owns the authenticated transport connection and drives the dispatch loop:
//! authenticate, log who we are, pull events one at a time through the
//! ingestor and router, and close the transport on the way out.
//!
//! Only an authentication failure or a dropped connection ends a run with an
//! error. Once a `Session` exists, `run` closes it on every exit path.

use chrono::{DateTime, Utc};
use futures::StreamExt;
use std::future::Future;
use std::sync::Arc;

use crate::application::ingest;
use crate::application::reply::ReplyEmitter;
use crate::application::router::{CommandRouter, DispatchOutcome};
use crate::application::state::ConversationStore;
use crate::domain::config::BotConfig;
use crate::domain::errors::{AuthError, ConnectionError, IdentityLookupError, SessionError};
use crate::domain::traits::{ChatTransport, EventStream};
use crate::domain::types::{Credentials, Profile};
use crate::strings::logs;

/// An authenticated connection. Consumed by `SessionManager::shutdown`.
pub struct Session {
    self_id: String,
    authenticated_at: DateTime<Utc>,
    transport: Arc<dyn ChatTransport>,
}

impl Session {
    pub fn self_id(&self) -> &str {
        &self.self_id
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub received: u64,
    pub handled: u64,
    pub ignored: u64,
    pub failed: u64,
}

impl SessionStats {
    fn record(&mut self, outcome: DispatchOutcome) {
        self.received += 1;
        match outcome {
            DispatchOutcome::Handled(_) => self.handled += 1,
            DispatchOutcome::SelfAuthored | DispatchOutcome::Ignored => self.ignored += 1,
            DispatchOutcome::Failed(_) => self.failed += 1,
        }
    }
}

pub struct SessionManager {
    transport: Arc<dyn ChatTransport>,
    bot: BotConfig,
}

impl SessionManager {
    pub fn new(transport: Arc<dyn ChatTransport>, bot: BotConfig) -> Self {
        Self { transport, bot }
    }

    /// Full lifecycle. `shutdown_signal` resolving ends the loop cleanly.
    pub async fn run<F>(
        &self,
        credentials: &Credentials,
        shutdown_signal: F,
    ) -> Result<SessionStats, SessionError>
    where
        F: Future<Output = ()>,
    {
        let session = self.authenticate(credentials).await?;

        // Missing profile info is not worth failing startup over.
        let _ = self.log_identity(&session).await;

        let outcome = self.serve(&session, shutdown_signal).await;
        self.shutdown(session).await;
        Ok(outcome?)
    }

    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        let identity = self
            .transport
            .authenticate(credentials)
            .await
            .map_err(|e| {
                tracing::error!("{}", logs::login_failed(&e.to_string()));
                AuthError::Rejected(e)
            })?;

        if identity.user_id.is_empty() {
            tracing::error!("{}", logs::login_failed("no identity returned"));
            return Err(AuthError::NoIdentity);
        }

        Ok(Session {
            self_id: identity.user_id,
            authenticated_at: Utc::now(),
            transport: self.transport.clone(),
        })
    }

    /// Logs the bot's own profile. Lookup failures are reported as warnings.
    pub async fn log_identity(&self, session: &Session) -> Result<Option<Profile>, IdentityLookupError> {
        match session.transport.fetch_identity_info(&session.self_id).await {
            Ok(Some(profile)) => {
                let name = profile.display_name.as_deref().unwrap_or(profile.user_id.as_str());
                tracing::info!("{}", logs::logged_in(&session.self_id, name));
                Ok(Some(profile))
            }
            Ok(None) => {
                tracing::info!("{}", logs::logged_in_without_profile(&session.self_id));
                Ok(None)
            }
            Err(source) => {
                let err = IdentityLookupError {
                    user_id: session.self_id.clone(),
                    source,
                };
                tracing::warn!("{}", logs::profile_lookup_failed(&err.to_string()));
                Err(err)
            }
        }
    }

    pub async fn listen(&self, session: &Session) -> Result<EventStream, ConnectionError> {
        tracing::info!("{}", logs::LISTEN_START);
        session.transport.listen().await.map_err(|e| {
            tracing::error!("{}", logs::listen_failed(&e.to_string()));
            ConnectionError(e)
        })
    }

    /// Processes events strictly one after another until the stream ends,
    /// the connection drops, or `shutdown_signal` resolves.
    pub async fn serve<F>(
        &self,
        session: &Session,
        shutdown_signal: F,
    ) -> Result<SessionStats, ConnectionError>
    where
        F: Future<Output = ()>,
    {
        let mut events = self.listen(session).await?;
        let router = CommandRouter::new(session.self_id());
        let replies = ReplyEmitter::new(session.transport.clone(), self.bot.auto_reply_enabled);
        let mut store = ConversationStore::new();
        let mut stats = SessionStats::default();

        if !replies.auto_reply_enabled() {
            tracing::warn!("{}", logs::DRY_RUN);
        }

        tokio::pin!(shutdown_signal);

        let result = loop {
            let next = tokio::select! {
                biased;
                _ = &mut shutdown_signal => {
                    tracing::info!("{}", logs::SHUTDOWN);
                    break Ok(());
                }
                next = events.next() => next,
            };

            match next {
                Some(Ok(raw)) => {
                    let event = ingest::normalize(raw);
                    tracing::info!("{}", logs::received(&event));
                    let outcome = router.dispatch(&event, &mut store, &replies).await;
                    stats.record(outcome);
                }
                Some(Err(e)) => {
                    tracing::error!("{}", logs::listen_failed(&e.to_string()));
                    break Err(ConnectionError(e));
                }
                None => break Ok(()),
            }
        };

        let uptime = (Utc::now() - session.authenticated_at).num_seconds();
        tracing::info!("{}", logs::session_summary(&stats, uptime));
        result.map(|()| stats)
    }

    /// Releases the transport. Errors are logged, never returned.
    pub async fn shutdown(&self, session: Session) {
        match session.transport.close().await {
            Ok(()) => tracing::info!("Closed connection for {}", session.self_id),
            Err(e) => tracing::warn!("{}", logs::close_failed(&e.to_string())),
        }
    }
}
