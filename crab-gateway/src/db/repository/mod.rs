//! Repository Module
//!
//! Free functions over a `SqlitePool`, one file per table group. Money is
//! stored as INTEGER thousandths and converted at this boundary.

pub mod audit;
pub mod order;
pub mod shift;
pub mod tenant;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::utils::money;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepoError::NotFound("row not found".into()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                RepoError::Duplicate(db.message().to_string())
            }
            other => RepoError::Database(other.to_string()),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Decimal → stored minor units
pub(crate) fn minor(value: Decimal) -> RepoResult<i64> {
    money::to_minor(value)
        .ok_or_else(|| RepoError::Validation(format!("amount out of range: {value}")))
}
