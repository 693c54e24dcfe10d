//! Shift API 模块 (班次管理)

use axum::{Router, extract::State, routing::post};
use shared::error::AppResult;
use shared::models::Shift;
use shared::request::{CloseShiftRequest, OpenShiftRequest};
use shared::response::ActionResponse;

use super::ValidJson;
use crate::auth::Caller;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/shifts", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/open", post(open))
        .route("/close", post(close))
}

/// POST /api/shifts/open - 开班
async fn open(
    State(state): State<ServerState>,
    caller: Caller,
    ValidJson(req): ValidJson<OpenShiftRequest>,
) -> AppResult<ActionResponse<Shift>> {
    state.gateway.open_shift(&caller, req).await
}

/// POST /api/shifts/close - 交班
async fn close(
    State(state): State<ServerState>,
    caller: Caller,
    ValidJson(req): ValidJson<CloseShiftRequest>,
) -> AppResult<ActionResponse<Shift>> {
    state.gateway.close_shift(&caller, req).await
}
