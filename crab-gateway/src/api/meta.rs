//! Read-only rule metadata and diagnostics
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/invariants | GET | 不变式注册表 |
//! | /api/actions | GET | 动作描述表 |
//! | /api/diagnostics/explain | POST | 解释拒绝原因 (只读) |

use axum::{
    Json, Router,
    routing::{get, post},
};

use super::ValidJson;
use crate::actions::{self, ActionDescriptor};
use crate::auth::Caller;
use crate::core::ServerState;
use crate::diagnostics::{self, Diagnosis, DiagnosticRequest};
use crate::invariants::{self, Invariant};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/invariants", get(list_invariants))
        .route("/api/actions", get(list_actions))
        .route("/api/diagnostics/explain", post(explain))
}

async fn list_invariants(_caller: Caller) -> Json<&'static [Invariant]> {
    Json(invariants::all())
}

async fn list_actions(_caller: Caller) -> Json<&'static [&'static ActionDescriptor]> {
    Json(actions::all())
}

/// Explain a rejection; no role is required and nothing is read from storage
async fn explain(caller: Caller, ValidJson(req): ValidJson<DiagnosticRequest>) -> Json<Diagnosis> {
    let diagnosis = diagnostics::explain(&req);
    tracing::debug!(
        user_id = %caller.user_id,
        action = %req.action,
        blocking = ?diagnosis.blocking.as_ref().map(|f| f.invariant_id),
        "Diagnosis produced"
    );
    Json(diagnosis)
}
