//! Unified error system for the transition gateway
//!
//! - [`ErrorCode`]: the stable machine-readable codes clients switch on
//! - [`AppError`]: code, human-readable message and optional details
//! - [`ErrorBody`]: the `{"error": {...}}` envelope written on failure
//!
//! # Codes
//!
//! | code                | HTTP |
//! |---------------------|------|
//! | `unauthenticated`   | 401  |
//! | `forbidden`         | 403  |
//! | `not_found`         | 404  |
//! | `invariant_blocked` | 409  |
//! | `conflict`          | 409  |
//! | `validation_error`  | 422  |
//! | `internal_error`    | 500  |
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::invariant_blocked("order_not_empty", "An order with no items cannot be paid")
//!     .with_detail("orderId", 42);
//! assert_eq!(err.code, ErrorCode::InvariantBlocked);
//! ```

mod codes;
mod http;
mod types;

pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult, ErrorBody, ErrorPayload};
