//! In-memory session store.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::domain::sessions::{SessionError, SessionKey, SessionStore};

#[derive(Debug, Default)]
struct Entry {
    values: FxHashMap<String, Value>,
    expires_at: Option<Timestamp>,
}

impl Entry {
    fn is_live(&self, now: Timestamp) -> bool {
        self.expires_at.is_none_or(|expires_at| expires_at > now)
    }
}

/// Process-local store, lost on restart. Suitable for tests and single-node development.
#[derive(Debug, Clone)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<FxHashMap<SessionKey, Entry>>>,
    ttl: SignedDuration,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new(ttl: SignedDuration) -> Self {
        Self {
            sessions: Arc::default(),
            ttl,
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, session: &SessionKey, name: &str) -> Result<Option<Value>, SessionError> {
        let sessions = self.sessions.read().await;

        Ok(sessions
            .get(session)
            .filter(|entry| entry.is_live(Timestamp::now()))
            .and_then(|entry| entry.values.get(name).cloned()))
    }

    async fn set(
        &self,
        session: &SessionKey,
        name: &str,
        value: Value,
    ) -> Result<(), SessionError> {
        let now = Timestamp::now();
        let mut sessions = self.sessions.write().await;

        sessions.retain(|_, entry| entry.is_live(now));

        let entry = sessions.entry(session.clone()).or_default();

        entry.values.insert(name.to_string(), value);
        entry.expires_at = now.checked_add(self.ttl).ok();

        Ok(())
    }

    async fn remove(&self, session: &SessionKey, name: &str) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;

        if let Some(entry) = sessions.get_mut(session) {
            entry.values.remove(name);
        }

        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, SessionError> {
        let now = Timestamp::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|_, entry| entry.is_live(now));

        Ok(u64::try_from(before - sessions.len()).unwrap_or(u64::MAX))
    }
}
