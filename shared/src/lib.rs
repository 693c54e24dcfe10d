//! Shared types for the Crab transition gateway
//!
//! Wire types used by the gateway server and its clients: error codes and
//! the error envelope, domain models, request bodies and the success
//! envelope.

pub mod error;
pub mod models;
pub mod request;
pub mod response;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCode};
pub use response::{ActionResponse, WarningNotice};
