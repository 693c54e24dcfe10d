//! Success envelope
//!
//! ```json
//! {
//!     "success": true,
//!     "entity": { "id": 1, "status": "open", ... },
//!     "warnings": [{ "id": "kitchen_display_enabled", "rule": "..." }]
//! }
//! ```

use serde::{Deserialize, Serialize};

/// A warning-severity invariant that failed but did not block the action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningNotice {
    pub id: String,
    pub rule: String,
}

/// Response for a committed transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse<T> {
    pub success: bool,
    pub entity: T,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<WarningNotice>,
}

impl<T> ActionResponse<T> {
    pub fn ok(entity: T) -> Self {
        Self {
            success: true,
            entity,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<WarningNotice>) -> Self {
        self.warnings = warnings;
        self
    }
}

impl<T: Serialize> axum::response::IntoResponse for ActionResponse<T> {
    fn into_response(self) -> axum::response::Response {
        (http::StatusCode::OK, axum::Json(self)).into_response()
    }
}
