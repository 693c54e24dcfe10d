//! Data models
//!
//! Shared between the gateway and its clients (via API).
//! Enums stored as TEXT use `#[cfg_attr(feature = "db", derive(sqlx::Type))]`.
//! All IDs are `i64` row ids, money is `Decimal` with three places.

pub mod order;
pub mod payment;
pub mod restaurant;
pub mod shift;
pub mod staff;

// Re-exports
pub use order::*;
pub use payment::*;
pub use restaurant::*;
pub use shift::*;
pub use staff::*;

/// Error returned when parsing an unknown enum value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
