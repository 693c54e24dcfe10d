use shared::error::ErrorCode;
use shared::models::{OrderStatus, PaymentMethod, ShiftStatus};
use shared::request::{CloseShiftRequest, CompletePaymentRequest, EntityKind, OpenShiftRequest, TenderInput};

use super::fixtures::*;

fn open_at(branch_id: i64, cash: &str) -> OpenShiftRequest {
    OpenShiftRequest {
        target_entity_id: branch_id,
        entity_type: Some(EntityKind::Branch),
        opening_cash: dec(cash),
        note: None,
    }
}

fn close(shift_id: i64, counted: &str) -> CloseShiftRequest {
    CloseShiftRequest {
        target_entity_id: shift_id,
        entity_type: None,
        closing_cash: dec(counted),
        note: Some("end of day".into()),
    }
}

#[tokio::test]
async fn test_open_shift() {
    let fx = setup().await;
    let resp = fx.gateway.open_shift(&caller(CASHIER), open_at(BRANCH, "150.5")).await.unwrap();

    let shift = resp.entity;
    assert_eq!(shift.status, ShiftStatus::Open);
    assert_eq!(shift.cashier_id, CASHIER);
    assert_eq!(shift.branch_id, BRANCH);
    assert_eq!(shift.opening_cash, dec("150.5"));
    assert_eq!(shift.closing_cash, None);

    let trail = fx.audit_trail("shift", shift.id).await;
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].action, "shift_opened");
}

#[tokio::test]
async fn test_one_open_shift_per_cashier() {
    let fx = setup().await;
    fx.open_shift(CASHIER, "0").await;

    let err = fx.gateway.open_shift(&caller(CASHIER), open_at(BRANCH, "0")).await.unwrap_err();
    assert_blocked_by(&err, "single_open_shift_per_cashier");

    // Another cashier is unaffected
    fx.open_shift(CASHIER_2, "0").await;
}

#[tokio::test]
async fn test_open_shift_validation() {
    let fx = setup().await;

    let err = fx.gateway.open_shift(&caller(CASHIER), open_at(BRANCH, "-1")).await.unwrap_err();
    assert_code(&err, ErrorCode::ValidationError);
    assert_eq!(err.detail("field"), Some(&serde_json::json!("openingCash")));

    let err = fx.gateway.open_shift(&caller(CASHIER), open_at(99_999, "0")).await.unwrap_err();
    assert_code(&err, ErrorCode::NotFound);

    let mut wrong_kind = open_at(BRANCH, "0");
    wrong_kind.entity_type = Some(EntityKind::Order);
    let err = fx.gateway.open_shift(&caller(CASHIER), wrong_kind).await.unwrap_err();
    assert_code(&err, ErrorCode::ValidationError);
}

#[tokio::test]
async fn test_open_shift_outside_scope() {
    let fx = setup().await;

    for branch in [SECOND_BRANCH, OTHER_BRANCH] {
        let err = fx.gateway.open_shift(&caller(CASHIER), open_at(branch, "0")).await.unwrap_err();
        assert_code(&err, ErrorCode::Forbidden);
    }

    let err = fx.gateway.open_shift(&caller(KITCHEN), open_at(BRANCH, "0")).await.unwrap_err();
    assert_code(&err, ErrorCode::Forbidden);
}

#[tokio::test]
async fn test_close_balanced_shift() {
    let fx = setup().await;
    let shift = fx.open_shift(CASHIER, "100").await;
    let order = fx
        .order_in(RESTAURANT, BRANCH, OrderStatus::Open, Some(shift.id), &[("Pho", 1, "17")])
        .await;
    fx.gateway
        .complete_payment(
            &caller(CASHIER),
            CompletePaymentRequest {
                target_entity_id: order.id,
                entity_type: None,
                payments: vec![
                    TenderInput {
                        method: PaymentMethod::Cash,
                        amount: dec("20"),
                    },
                ],
            },
        )
        .await
        .unwrap();

    let resp = fx.gateway.close_shift(&caller(CASHIER), close(shift.id, "117")).await.unwrap();

    assert!(resp.warnings.is_empty());
    let closed = resp.entity;
    assert_eq!(closed.status, ShiftStatus::Closed);
    assert_eq!(closed.closing_cash, Some(dec("117")));
    assert_eq!(closed.expected_cash, Some(dec("117")));
    assert_eq!(closed.cash_difference, Some(dec("0")));
    assert_eq!(closed.closed_by.as_deref(), Some(CASHIER));

    let trail = fx.audit_trail("shift", shift.id).await;
    assert_eq!(trail.last().unwrap().action, "shift_closed");
    assert_eq!(trail.last().unwrap().before_status.as_deref(), Some("open"));
}

#[tokio::test]
async fn test_close_short_drawer_warns() {
    let fx = setup().await;
    let shift = fx.open_shift(CASHIER, "100").await;

    let resp = fx.gateway.close_shift(&caller(CASHIER), close(shift.id, "99.5")).await.unwrap();

    assert_eq!(resp.entity.status, ShiftStatus::Closed);
    assert_eq!(resp.entity.cash_difference, Some(dec("-0.5")));
    assert_eq!(resp.warnings.len(), 1);
    assert_eq!(resp.warnings[0].id, "shift_cash_balanced");
}

#[tokio::test]
async fn test_close_blocked_by_open_orders() {
    let fx = setup().await;
    let shift = fx.open_shift(CASHIER, "0").await;
    let held = fx
        .order_in(RESTAURANT, BRANCH, OrderStatus::Held, Some(shift.id), &[("Pho", 1, "8")])
        .await;

    let err = fx.gateway.close_shift(&caller(CASHIER), close(shift.id, "0")).await.unwrap_err();
    assert_blocked_by(&err, "shift_no_open_orders");

    fx.gateway
        .void_order(
            &caller(OWNER),
            shared::request::ReasonRequest {
                target_entity_id: held.id,
                entity_type: None,
                reason: "walked out".into(),
            },
        )
        .await
        .unwrap();
    let resp = fx.gateway.close_shift(&caller(CASHIER), close(shift.id, "0")).await.unwrap();
    assert_eq!(resp.entity.status, ShiftStatus::Closed);
}

#[tokio::test]
async fn test_close_twice() {
    let fx = setup().await;
    let shift = fx.open_shift(CASHIER, "0").await;
    fx.gateway.close_shift(&caller(CASHIER), close(shift.id, "0")).await.unwrap();

    let err = fx.gateway.close_shift(&caller(CASHIER), close(shift.id, "0")).await.unwrap_err();
    assert_blocked_by(&err, "shift_is_open");

    // The cashier may open a fresh shift afterwards
    fx.open_shift(CASHIER, "0").await;
}

#[tokio::test]
async fn test_only_owner_closes_foreign_shift() {
    let fx = setup().await;
    let shift = fx.open_shift(CASHIER, "0").await;

    let err = fx.gateway.close_shift(&caller(CASHIER_2), close(shift.id, "0")).await.unwrap_err();
    assert_code(&err, ErrorCode::Forbidden);

    let err = fx.gateway.close_shift(&caller(OUTSIDER), close(shift.id, "0")).await.unwrap_err();
    assert_code(&err, ErrorCode::Forbidden);

    let resp = fx.gateway.close_shift(&caller(OWNER), close(shift.id, "0")).await.unwrap();
    assert_eq!(resp.entity.closed_by.as_deref(), Some(OWNER));
}

#[tokio::test]
async fn test_close_unknown_shift() {
    let fx = setup().await;
    let err = fx.gateway.close_shift(&caller(OWNER), close(31_337, "0")).await.unwrap_err();
    assert_code(&err, ErrorCode::NotFound);
}

#[tokio::test]
async fn test_close_reports_committed_shift_without_reloading() {
    let fx = setup().await;
    let shift = fx.open_shift(CASHIER, "40").await;

    let resp = read_once_gateway(&fx.db)
        .close_shift(&caller(CASHIER), close(shift.id, "41"))
        .await
        .unwrap();

    let stored = crate::db::repository::shift::find_by_id(&fx.db.pool, shift.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resp.entity, stored);
    assert_eq!(resp.entity.expected_cash, Some(dec("40")));
    assert_eq!(resp.entity.cash_difference, Some(dec("1")));
    assert_eq!(resp.entity.note.as_deref(), Some("end of day"));
    assert_eq!(resp.warnings[0].id, "shift_cash_balanced");
}

#[tokio::test]
async fn test_open_shift_response_matches_stored_row() {
    let fx = setup().await;
    let resp = fx.gateway.open_shift(&caller(CASHIER), open_at(BRANCH, "12.5")).await.unwrap();
    let stored = crate::db::repository::shift::find_by_id(&fx.db.pool, resp.entity.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resp.entity, stored);
}
