//! Sessions
//!
//! Server-side key/value storage scoped to an anonymous visitor.

pub mod errors;
pub mod key;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use mockall::automock;
use serde_json::Value;

pub use errors::SessionError;
pub use key::SessionKey;
pub use memory::MemorySessionStore;
pub use postgres::PgSessionStore;

/// Per-session storage of named JSON values.
#[automock]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read `name` from the session; `None` when unset or the session expired.
    async fn get(&self, session: &SessionKey, name: &str) -> Result<Option<Value>, SessionError>;

    /// Store `name` and refresh the session expiry.
    async fn set(&self, session: &SessionKey, name: &str, value: Value)
    -> Result<(), SessionError>;

    async fn remove(&self, session: &SessionKey, name: &str) -> Result<(), SessionError>;

    /// Delete every expired session, returning how many went.
    async fn purge_expired(&self) -> Result<u64, SessionError>;
}
