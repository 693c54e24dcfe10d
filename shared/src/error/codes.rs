//! Error codes
//!
//! Codes travel as snake_case strings so the presentation layer can match on
//! them without a lookup table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable error code carried by every rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Credential missing, malformed, invalid or expired
    Unauthenticated,
    /// Role not permitted, scope missing, other tenant's entity, tenant inactive
    Forbidden,
    /// Target entity does not exist
    NotFound,
    /// A blocking invariant failed
    InvariantBlocked,
    /// Lost an optimistic concurrency race
    Conflict,
    /// Malformed or structurally invalid request
    ValidationError,
    /// Storage or transport failure
    InternalError,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 7] = [
        Self::Unauthenticated,
        Self::Forbidden,
        Self::NotFound,
        Self::InvariantBlocked,
        Self::Conflict,
        Self::ValidationError,
        Self::InternalError,
    ];

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::InvariantBlocked => "invariant_blocked",
            Self::Conflict => "conflict",
            Self::ValidationError => "validation_error",
            Self::InternalError => "internal_error",
        }
    }

    /// Default message for this code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "Authentication required",
            Self::Forbidden => "Permission denied",
            Self::NotFound => "Resource not found",
            Self::InvariantBlocked => "Blocked by a business rule",
            Self::Conflict => {
                "The entity was modified by another request; re-fetch it and decide again"
            }
            Self::ValidationError => "Invalid request",
            Self::InternalError => "Internal server error",
        }
    }

    /// Errors that indicate a server-side fault rather than a caller mistake
    pub fn is_system(&self) -> bool {
        matches!(self, Self::InternalError)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown code string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid error code: {0}")]
pub struct InvalidErrorCode(pub String);

impl std::str::FromStr for ErrorCode {
    type Err = InvalidErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| InvalidErrorCode(s.to_string()))
    }
}
