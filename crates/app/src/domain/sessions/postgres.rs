//! Postgres-backed session store.

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use jiff_sqlx::Timestamp as SqlxTimestamp;
use serde_json::Value;
use sqlx::{query, query_scalar};

use crate::{
    database::Db,
    domain::sessions::{SessionError, SessionKey, SessionStore},
};

const GET_SESSION_VALUE_SQL: &str = include_str!("sql/get_session_value.sql");
const SET_SESSION_VALUE_SQL: &str = include_str!("sql/set_session_value.sql");
const REMOVE_SESSION_VALUE_SQL: &str = include_str!("sql/remove_session_value.sql");
const PURGE_EXPIRED_SESSIONS_SQL: &str = include_str!("sql/purge_expired_sessions.sql");

/// Sessions persisted in the `sessions` table, one JSONB document per key.
#[derive(Debug, Clone)]
pub struct PgSessionStore {
    db: Db,
    ttl: SignedDuration,
}

impl PgSessionStore {
    #[must_use]
    pub fn new(db: Db, ttl: SignedDuration) -> Self {
        Self { db, ttl }
    }

    fn expires_at(&self) -> SqlxTimestamp {
        let now = Timestamp::now();

        SqlxTimestamp::from(now.checked_add(self.ttl).unwrap_or(now))
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn get(&self, session: &SessionKey, name: &str) -> Result<Option<Value>, SessionError> {
        let value = query_scalar::<_, Option<Value>>(GET_SESSION_VALUE_SQL)
            .bind(session.as_str())
            .bind(name)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(value.flatten())
    }

    async fn set(
        &self,
        session: &SessionKey,
        name: &str,
        value: Value,
    ) -> Result<(), SessionError> {
        query(SET_SESSION_VALUE_SQL)
            .bind(session.as_str())
            .bind(name)
            .bind(value)
            .bind(self.expires_at())
            .execute(self.db.pool())
            .await?;

        Ok(())
    }

    async fn remove(&self, session: &SessionKey, name: &str) -> Result<(), SessionError> {
        query(REMOVE_SESSION_VALUE_SQL)
            .bind(session.as_str())
            .bind(name)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, SessionError> {
        let purged = query(PURGE_EXPIRED_SESSIONS_SQL)
            .execute(self.db.pool())
            .await?
            .rows_affected();

        Ok(purged)
    }
}
