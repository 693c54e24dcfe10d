//! Order API 模块
//!
//! | 路径 | 动作 |
//! |------|------|
//! | POST /api/orders/accept | accept_order |
//! | POST /api/orders/reject | reject_order |
//! | POST /api/orders/hold | hold_order |
//! | POST /api/orders/resume | resume_order |
//! | POST /api/orders/void | void_order |
//! | POST /api/orders/void-item | void_item |
//! | POST /api/orders/pay | complete_payment |
//! | POST /api/orders/refund | refund_order |

use axum::{Router, extract::State, routing::post};
use shared::error::AppResult;
use shared::models::OrderProjection;
use shared::request::{
    CompletePaymentRequest, OrderActionRequest, ReasonRequest, RefundRequest, VoidItemRequest,
};
use shared::response::ActionResponse;

use super::ValidJson;
use crate::auth::Caller;
use crate::core::ServerState;

type OrderResponse = AppResult<ActionResponse<OrderProjection>>;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/accept", post(accept))
        .route("/reject", post(reject))
        .route("/hold", post(hold))
        .route("/resume", post(resume))
        .route("/void", post(void))
        .route("/void-item", post(void_item))
        .route("/pay", post(pay))
        .route("/refund", post(refund))
}

async fn accept(
    State(state): State<ServerState>,
    caller: Caller,
    ValidJson(req): ValidJson<OrderActionRequest>,
) -> OrderResponse {
    state.gateway.accept_order(&caller, req).await
}

async fn reject(
    State(state): State<ServerState>,
    caller: Caller,
    ValidJson(req): ValidJson<ReasonRequest>,
) -> OrderResponse {
    state.gateway.reject_order(&caller, req).await
}

async fn hold(
    State(state): State<ServerState>,
    caller: Caller,
    ValidJson(req): ValidJson<OrderActionRequest>,
) -> OrderResponse {
    state.gateway.hold_order(&caller, req).await
}

async fn resume(
    State(state): State<ServerState>,
    caller: Caller,
    ValidJson(req): ValidJson<OrderActionRequest>,
) -> OrderResponse {
    state.gateway.resume_order(&caller, req).await
}

async fn void(
    State(state): State<ServerState>,
    caller: Caller,
    ValidJson(req): ValidJson<ReasonRequest>,
) -> OrderResponse {
    state.gateway.void_order(&caller, req).await
}

async fn void_item(
    State(state): State<ServerState>,
    caller: Caller,
    ValidJson(req): ValidJson<VoidItemRequest>,
) -> OrderResponse {
    state.gateway.void_item(&caller, req).await
}

async fn pay(
    State(state): State<ServerState>,
    caller: Caller,
    ValidJson(req): ValidJson<CompletePaymentRequest>,
) -> OrderResponse {
    state.gateway.complete_payment(&caller, req).await
}

async fn refund(
    State(state): State<ServerState>,
    caller: Caller,
    ValidJson(req): ValidJson<RefundRequest>,
) -> OrderResponse {
    state.gateway.refund_order(&caller, req).await
}
