use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use super::domain::{ChatId, CompletedApplication, Session, Step};
use super::machine::{IntakeMachine, Transition};
use super::prompts;
use super::store::{SessionStore, StoreError};
use super::transport::{ChatTransport, InboundEvent, TransportError};
use crate::config::IntakeConfig;

/// Service composing the step machine, the session store, and the chat transport.
pub struct IntakeService<S, T> {
    store: Arc<S>,
    transport: Arc<T>,
    machine: IntakeMachine,
    config: IntakeConfig,
}

/// What happened to a chat after one event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handled {
    pub step: Option<Step>,
    pub submitted: bool,
}

impl<S, T> IntakeService<S, T>
where
    S: SessionStore + 'static,
    T: ChatTransport + 'static,
{
    pub fn new(store: Arc<S>, transport: Arc<T>, config: IntakeConfig) -> Self {
        let machine = IntakeMachine::new(config.document_routing);
        Self {
            store,
            transport,
            machine,
            config,
        }
    }

    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }

    pub async fn handle(
        &self,
        chat: ChatId,
        event: InboundEvent,
    ) -> Result<Handled, IntakeServiceError> {
        self.handle_at(chat, event, Utc::now()).await
    }

    /// Applies one inbound event as of `now`, persists the resulting session, and sends replies.
    pub async fn handle_at(
        &self,
        chat: ChatId,
        event: InboundEvent,
        now: DateTime<Utc>,
    ) -> Result<Handled, IntakeServiceError> {
        let previous = self.live_session(chat, now)?;
        let Transition {
            session,
            replies,
            completed,
        } = self
            .machine
            .apply(chat, previous.clone(), event, now);

        if let Some(application) = completed {
            return self.complete(chat, previous, session, application, now).await;
        }

        let step = session.as_ref().map(|session| session.step);
        if let Some(session) = session {
            self.store.upsert(chat, session)?;
        }
        for reply in &replies {
            self.reply(chat, reply).await;
        }

        Ok(Handled {
            step,
            submitted: false,
        })
    }

    /// Current session for a chat, ignoring sessions that have outlived the idle TTL.
    pub fn session(&self, chat: ChatId) -> Result<Option<Session>, IntakeServiceError> {
        self.live_session(chat, Utc::now())
    }

    pub fn evict_expired(&self, now: DateTime<Utc>) -> Result<usize, IntakeServiceError> {
        let Some(cutoff) = now.checked_sub_signed(self.config.session_ttl) else {
            return Ok(0);
        };
        let evicted = self.store.evict_idle(cutoff)?;
        if evicted > 0 {
            info!(evicted, "evicted idle intake sessions");
        }
        Ok(evicted)
    }

    fn live_session(
        &self,
        chat: ChatId,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>, IntakeServiceError> {
        let Some(session) = self.store.get(chat)? else {
            return Ok(None);
        };
        let expired = now
            .checked_sub_signed(self.config.session_ttl)
            .is_some_and(|cutoff| session.is_idle_since(cutoff));
        if expired {
            debug!(%chat, step = session.step.label(), "discarding expired session");
            self.store.delete(chat)?;
            return Ok(None);
        }
        Ok(Some(session))
    }

    async fn complete(
        &self,
        chat: ChatId,
        previous: Option<Session>,
        session: Option<Session>,
        application: CompletedApplication,
        now: DateTime<Utc>,
    ) -> Result<Handled, IntakeServiceError> {
        match self.forward_to_reviewer(&application).await {
            Ok(()) => {
                info!(%chat, reviewer = %self.config.reviewer_chat_id, "application forwarded to reviewer");
                let step = session.as_ref().map(|session| session.step);
                if let Some(session) = session {
                    self.store.upsert(chat, session)?;
                }
                self.reply(chat, prompts::APPLICATION_COMPLETE).await;
                Ok(Handled {
                    step,
                    submitted: true,
                })
            }
            Err(err) => {
                error!(%chat, error = %err, "reviewer notification failed; CV not recorded");
                let step = previous.as_ref().map(|session| session.step);
                if let Some(mut previous) = previous {
                    previous.touch(now);
                    self.store.upsert(chat, previous)?;
                }
                self.reply(chat, prompts::DELIVERY_FAILED).await;
                Ok(Handled {
                    step,
                    submitted: false,
                })
            }
        }
    }

    async fn forward_to_reviewer(
        &self,
        application: &CompletedApplication,
    ) -> Result<(), TransportError> {
        let reviewer = self.config.reviewer_chat_id;
        let summary = application.summary();
        self.with_retry(reviewer, || self.transport.send_text(reviewer, &summary))
            .await?;
        for handle in [&application.cover_letter, &application.cv] {
            self.with_retry(reviewer, || self.transport.send_document(reviewer, handle))
                .await?;
        }
        Ok(())
    }

    async fn reply(&self, chat: ChatId, text: &str) {
        if let Err(err) = self
            .with_retry(chat, || self.transport.send_text(chat, text))
            .await
        {
            error!(%chat, error = %err, "reply could not be delivered");
        }
    }

    async fn with_retry<F, Fut>(&self, chat: ChatId, mut send: F) -> Result<(), TransportError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), TransportError>>,
    {
        let attempts = self.config.delivery.attempts.max(1);
        let mut attempt = 1;
        loop {
            match send().await {
                Ok(()) => return Ok(()),
                Err(err) if attempt < attempts => {
                    warn!(%chat, attempt, error = %err, "outbound send failed; retrying");
                    tokio::time::sleep(self.config.delivery.backoff * attempt).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Error raised by the intake service. Delivery failures are logged rather than returned.
#[derive(Debug, thiserror::Error)]
pub enum IntakeServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
}
