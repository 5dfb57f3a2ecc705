//! Session errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid session key")]
    InvalidKey,

    #[error("storage error")]
    Sql(#[from] sqlx::Error),
}
