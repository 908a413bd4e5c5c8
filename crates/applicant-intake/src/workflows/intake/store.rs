use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use super::domain::{ChatId, Session};

/// Storage abstraction for conversation sessions so the service can be exercised in isolation.
pub trait SessionStore: Send + Sync {
    fn get(&self, id: ChatId) -> Result<Option<Session>, StoreError>;
    fn upsert(&self, id: ChatId, session: Session) -> Result<(), StoreError>;
    fn delete(&self, id: ChatId) -> Result<Option<Session>, StoreError>;
    /// Removes every session whose last activity is older than `cutoff`.
    fn evict_idle(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError>;
    fn count(&self) -> Result<usize, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// Process-local store; sessions do not survive a restart.
#[derive(Debug, Default, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<ChatId, Session>>>,
}

impl InMemorySessionStore {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<ChatId, Session>>, StoreError> {
        self.sessions
            .lock()
            .map_err(|_| StoreError::Unavailable("session mutex poisoned".to_string()))
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, id: ChatId) -> Result<Option<Session>, StoreError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    fn upsert(&self, id: ChatId, session: Session) -> Result<(), StoreError> {
        self.lock()?.insert(id, session);
        Ok(())
    }

    fn delete(&self, id: ChatId) -> Result<Option<Session>, StoreError> {
        Ok(self.lock()?.remove(&id))
    }

    fn evict_idle(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut guard = self.lock()?;
        let before = guard.len();
        guard.retain(|_, session| !session.is_idle_since(cutoff));
        Ok(before - guard.len())
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }
}
