//! HTTP API
//!
//! # 路由
//!
//! | 模块 | 前缀 | 认证 |
//! |------|------|------|
//! | orders | /api/orders | Bearer |
//! | shifts | /api/shifts | Bearer |
//! | meta | /api/invariants, /api/actions, /api/diagnostics | Bearer |
//! | health | /health | 无 |
//!
//! 认证由 [`Caller`](crate::auth::Caller) 提取器完成，授权在网关内部。

mod extract;
mod health;
mod meta;
mod middleware;
mod orders;
mod shifts;

#[cfg(test)]
mod tests;

pub use extract::ValidJson;

use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use uuid::Uuid;

use crate::core::ServerState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(orders::router())
        .merge(shifts::router())
        .merge(meta::router())
        .merge(health::router())
}

/// Build a fully configured application with all middleware
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    let config = &state.config;
    build_router()
        // Request timeout
        .layer(TimeoutLayer::new(Duration::from_millis(config.request_timeout_ms)))
        // Request logging
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        // Propagate request ID to response
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER)))
        // Request ID - outermost, so every log line can carry it
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        // Cap in-flight requests across all routes
        .layer(GlobalConcurrencyLimitLayer::new(config.max_connections.max(1)))
}
