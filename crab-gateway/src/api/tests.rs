use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use shared::models::OrderStatus;
use tower::ServiceExt;

use super::build_app;
use crate::auth::JwtConfig;
use crate::core::{Config, ServerState};
use crate::gateway::tests::fixtures::{self, BRANCH, CASHIER, OUTSIDER, RESTAURANT};

struct Harness {
    app: Router,
    state: ServerState,
    fx: fixtures::Fixture,
}

async fn harness() -> Harness {
    let db = fixtures::seeded().await;
    let config = Config::for_tests(JwtConfig::with_secret("0123456789abcdef0123456789abcdef"));
    let state = ServerState::new(config, db.clone());
    let app = build_app(&state).with_state(state.clone());
    let fx = fixtures::Fixture {
        db,
        gateway: state.gateway.clone(),
    };
    Harness { app, state, fx }
}

impl Harness {
    fn token(&self, user_id: &str) -> String {
        self.state.jwt.generate_token(user_id, user_id).unwrap()
    }

    async fn call(&self, req: Request<Body>) -> (StatusCode, http::HeaderMap, Value) {
        let response = self.app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, body)
    }

    async fn post(&self, uri: &str, user: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut builder = Request::post(uri).header("content-type", "application/json");
        if let Some(user) = user {
            builder = builder.header("authorization", format!("Bearer {}", self.token(user)));
        }
        let (status, _, body) = self
            .call(builder.body(Body::from(body.to_string())).unwrap())
            .await;
        (status, body)
    }
}

#[tokio::test]
async fn test_health_is_public() {
    let h = harness().await;
    let (status, headers, body) = h
        .call(Request::get("/health").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_missing_credential_is_unauthenticated() {
    let h = harness().await;
    let (status, body) = h
        .post("/api/orders/accept", None, json!({"targetEntityId": 1}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthenticated");
}

#[tokio::test]
async fn test_forged_credential_is_unauthenticated() {
    let h = harness().await;
    let req = Request::post("/api/orders/accept")
        .header("content-type", "application/json")
        .header("authorization", "Bearer not.a.jwt")
        .body(Body::from(json!({"targetEntityId": 1}).to_string()))
        .unwrap();
    let (status, _, body) = h.call(req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthenticated");
}

#[tokio::test]
async fn test_accept_round_trip() {
    let h = harness().await;
    let order = h.fx.order(OrderStatus::Pending, &[("Pho", 2, "8.5")]).await;

    let (status, body) = h
        .post(
            "/api/orders/accept",
            Some(CASHIER),
            json!({"targetEntityId": order.id, "entityType": "order"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["entity"]["id"], order.id);
    assert_eq!(body["entity"]["status"], "open");
    assert_eq!(body["entity"]["total"], 17.0);
    assert!(body.get("warnings").is_none());
}

#[tokio::test]
async fn test_held_payment_maps_to_conflict_status() {
    let h = harness().await;
    h.fx.open_shift(CASHIER, "0").await;
    let order = h.fx.order(OrderStatus::Held, &[("Pho", 1, "10")]).await;

    let (status, body) = h
        .post(
            "/api/orders/pay",
            Some(CASHIER),
            json!({"targetEntityId": order.id, "payments": [{"method": "cash", "amount": 10}]}),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "invariant_blocked");
    assert_eq!(body["error"]["details"]["invariantId"], "order_not_held_for_payment");
    assert_eq!(body["error"]["message"], "A held order cannot be paid");
}

#[tokio::test]
async fn test_cross_tenant_is_forbidden() {
    let h = harness().await;
    let order = h
        .fx
        .order_in(RESTAURANT, BRANCH, OrderStatus::Open, None, &[("Pho", 1, "10")])
        .await;

    let (status, body) = h
        .post("/api/orders/hold", Some(OUTSIDER), json!({"targetEntityId": order.id}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "forbidden");
}

#[tokio::test]
async fn test_wrong_entity_type_is_unprocessable() {
    let h = harness().await;
    let (status, body) = h
        .post(
            "/api/shifts/close",
            Some(CASHIER),
            json!({"targetEntityId": 1, "entityType": "order", "closingCash": 0}),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_malformed_body_is_unprocessable() {
    let h = harness().await;
    let (status, body) = h
        .post("/api/orders/reject", Some(CASHIER), json!({"targetEntityId": "seven"}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let h = harness().await;
    let (status, body) = h
        .post("/api/orders/resume", Some(CASHIER), json!({"targetEntityId": 987_654}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_shift_open_and_close() {
    let h = harness().await;
    let (status, body) = h
        .post(
            "/api/shifts/open",
            Some(CASHIER),
            json!({"targetEntityId": BRANCH, "openingCash": 50}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let shift_id = body["entity"]["id"].as_i64().unwrap();

    let (status, body) = h
        .post(
            "/api/shifts/close",
            Some(CASHIER),
            json!({"targetEntityId": shift_id, "closingCash": 49}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entity"]["status"], "closed");
    assert_eq!(body["entity"]["cashDifference"], -1.0);
    assert_eq!(body["warnings"][0]["id"], "shift_cash_balanced");
}

#[tokio::test]
async fn test_metadata_endpoints() {
    let h = harness().await;
    let token = h.token(CASHIER);

    let req = Request::get("/api/invariants")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = h.call(req).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<_> = body.as_array().unwrap().iter().map(|inv| inv["id"].clone()).collect();
    assert!(ids.contains(&json!("restaurant_active")));
    assert!(body[0].get("check").is_none());

    let req = Request::get("/api/actions")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = h.call(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_explain_held_payment() {
    let h = harness().await;
    let (status, body) = h
        .post(
            "/api/diagnostics/explain",
            Some(CASHIER),
            json!({
                "action": "complete_payment",
                "context": {"orderStatus": "held", "shiftOpen": true},
                "reportedCode": "invariant_blocked",
                "reportedInvariant": "order_not_held_for_payment"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["blocking"]["invariantId"], "order_not_held_for_payment");
    assert_eq!(body["confidence"], 1.0);
}
