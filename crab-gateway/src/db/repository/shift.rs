//! Shift Repository

use super::{RepoError, RepoResult, minor};
use crate::db::store::{NewShift, ShiftClosing};
use crate::utils::money;
use rust_decimal::Decimal;
use shared::models::{Shift, ShiftStatus};
use sqlx::SqlitePool;

const SHIFT_COLUMNS: &str = "id, restaurant_id, branch_id, cashier_id, status, opening_cash_minor, closing_cash_minor, expected_cash_minor, cash_difference_minor, opened_at, closed_at, closed_by, note";

/// Opening cash + cash tendered − change given, for payments settled in `?1`
const EXPECTED_CASH_SQL: &str = "SELECT s.opening_cash_minor \
     + COALESCE((SELECT SUM(p.amount_minor) FROM payments p WHERE p.shift_id = s.id AND p.method = 'cash'), 0) \
     - COALESCE((SELECT SUM(o.change_minor) FROM orders o WHERE o.shift_id = s.id AND o.status IN ('paid', 'closed')), 0) \
     FROM shifts s WHERE s.id = ?1";

#[derive(sqlx::FromRow)]
struct ShiftRow {
    id: i64,
    restaurant_id: i64,
    branch_id: i64,
    cashier_id: String,
    status: ShiftStatus,
    opening_cash_minor: i64,
    closing_cash_minor: Option<i64>,
    expected_cash_minor: Option<i64>,
    cash_difference_minor: Option<i64>,
    opened_at: i64,
    closed_at: Option<i64>,
    closed_by: Option<String>,
    note: Option<String>,
}

impl From<ShiftRow> for Shift {
    fn from(row: ShiftRow) -> Self {
        Self {
            id: row.id,
            restaurant_id: row.restaurant_id,
            branch_id: row.branch_id,
            cashier_id: row.cashier_id,
            status: row.status,
            opening_cash: money::from_minor(row.opening_cash_minor),
            closing_cash: row.closing_cash_minor.map(money::from_minor),
            expected_cash: row.expected_cash_minor.map(money::from_minor),
            cash_difference: row.cash_difference_minor.map(money::from_minor),
            opened_at: row.opened_at,
            closed_at: row.closed_at,
            closed_by: row.closed_by,
            note: row.note,
        }
    }
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Shift>> {
    let row = sqlx::query_as::<_, ShiftRow>(&format!(
        "SELECT {SHIFT_COLUMNS} FROM shifts WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Shift::from))
}

pub async fn find_open_for_cashier(pool: &SqlitePool, cashier_id: &str) -> RepoResult<Option<Shift>> {
    let row = sqlx::query_as::<_, ShiftRow>(&format!(
        "SELECT {SHIFT_COLUMNS} FROM shifts WHERE cashier_id = ? AND status = 'open' LIMIT 1"
    ))
    .bind(cashier_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Shift::from))
}

/// Open or held orders attached to the shift
pub async fn count_unsettled_orders(pool: &SqlitePool, shift_id: i64) -> RepoResult<u32> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM orders WHERE shift_id = ? AND status IN ('open', 'held')",
    )
    .bind(shift_id)
    .fetch_one(pool)
    .await?;
    Ok(u32::try_from(count).unwrap_or(u32::MAX))
}

/// Cash the drawer should hold right now
pub async fn expected_cash(pool: &SqlitePool, shift_id: i64) -> RepoResult<Decimal> {
    let expected: Option<i64> = sqlx::query_scalar(EXPECTED_CASH_SQL)
        .bind(shift_id)
        .fetch_optional(pool)
        .await?;
    expected
        .map(money::from_minor)
        .ok_or_else(|| RepoError::NotFound(format!("Shift {shift_id} not found")))
}

/// Insert an open shift; `None` when the cashier already has one
pub async fn open(pool: &SqlitePool, data: &NewShift) -> RepoResult<Option<i64>> {
    let id: Option<i64> = sqlx::query_scalar(
        "INSERT INTO shifts (restaurant_id, branch_id, cashier_id, status, opening_cash_minor, opened_at, note) VALUES (?, ?, ?, 'open', ?, ?, ?) ON CONFLICT DO NOTHING RETURNING id",
    )
    .bind(data.restaurant_id)
    .bind(data.branch_id)
    .bind(&data.cashier_id)
    .bind(minor(data.opening_cash)?)
    .bind(data.at)
    .bind(&data.note)
    .fetch_optional(pool)
    .await?;
    Ok(id)
}

/// Close an open shift with no unsettled orders and reconcile its drawer
///
/// Returns the expected cash recorded at close; `None` when the shift was
/// already closed or still holds open or held orders.
pub async fn close(pool: &SqlitePool, data: &ShiftClosing) -> RepoResult<Option<Decimal>> {
    let counted = minor(data.closing_cash)?;
    let mut tx = pool.begin().await?;

    let rows = sqlx::query(
        "UPDATE shifts SET status = 'closed', closing_cash_minor = ?1, closed_at = ?2, closed_by = ?3, note = COALESCE(?4, note) WHERE id = ?5 AND status = 'open' AND NOT EXISTS (SELECT 1 FROM orders WHERE shift_id = ?5 AND status IN ('open', 'held'))",
    )
    .bind(counted)
    .bind(data.at)
    .bind(&data.closed_by)
    .bind(&data.note)
    .bind(data.shift_id)
    .execute(&mut *tx)
    .await?;

    if rows.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(None);
    }

    let expected: i64 = sqlx::query_scalar(EXPECTED_CASH_SQL)
        .bind(data.shift_id)
        .fetch_one(&mut *tx)
        .await?;

    sqlx::query(
        "UPDATE shifts SET expected_cash_minor = ?1, cash_difference_minor = ?2 WHERE id = ?3",
    )
    .bind(expected)
    .bind(counted - expected)
    .bind(data.shift_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some(money::from_minor(expected)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::{order, tenant};
    use crate::db::store::Settlement;
    use crate::payment::Tender;
    use shared::models::{Branch, OrderStatus, PaymentMethod, Restaurant};

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    async fn setup() -> DbService {
        let db = DbService::in_memory().await.unwrap();
        tenant::create_restaurant(
            &db.pool,
            &Restaurant {
                id: 1,
                name: "Casa".into(),
                is_active: true,
                subscription_starts_at: 0,
                subscription_expires_at: None,
                qr_ordering_enabled: true,
                kitchen_display_enabled: true,
                inventory_enabled: false,
            },
        )
        .await
        .unwrap();
        tenant::create_branch(
            &db.pool,
            &Branch {
                id: 10,
                restaurant_id: 1,
                name: "Centro".into(),
            },
        )
        .await
        .unwrap();
        db
    }

    fn new_shift(cashier: &str, opening: &str) -> NewShift {
        NewShift {
            restaurant_id: 1,
            branch_id: 10,
            cashier_id: cashier.into(),
            opening_cash: dec(opening),
            note: None,
            at: 1,
        }
    }

    fn closing(shift_id: i64, counted: &str) -> ShiftClosing {
        ShiftClosing {
            shift_id,
            closing_cash: dec(counted),
            closed_by: "u-1".into(),
            note: None,
            at: 9,
        }
    }

    #[tokio::test]
    async fn test_one_open_shift_per_cashier() {
        let db = setup().await;
        let first = open(&db.pool, &new_shift("u-1", "100")).await.unwrap();
        assert!(first.is_some());
        assert_eq!(open(&db.pool, &new_shift("u-1", "50")).await.unwrap(), None);
        assert!(open(&db.pool, &new_shift("u-2", "50")).await.unwrap().is_some());

        let current = find_open_for_cashier(&db.pool, "u-1").await.unwrap().unwrap();
        assert_eq!(Some(current.id), first);
        assert_eq!(current.opening_cash, dec("100"));
    }

    #[tokio::test]
    async fn test_close_reconciles_cash() {
        let db = setup().await;
        let shift_id = open(&db.pool, &new_shift("u-1", "100")).await.unwrap().unwrap();

        let o = order::create(
            &db.pool,
            &order::NewOrder {
                restaurant_id: 1,
                branch_id: 10,
                table_id: None,
                shift_id: Some(shift_id),
                status: OrderStatus::Open,
                items: vec![order::NewOrderItem {
                    name: "Menu".into(),
                    quantity: 1,
                    unit_price: dec("18"),
                }],
            },
        )
        .await
        .unwrap();
        assert_eq!(count_unsettled_orders(&db.pool, shift_id).await.unwrap(), 1);

        // Open order blocks the close
        assert_eq!(close(&db.pool, &closing(shift_id, "118")).await.unwrap(), None);

        let settled = order::settle(
            &db.pool,
            &Settlement {
                order_id: o.id,
                shift_id,
                expected_total: o.total,
                change: dec("2"),
                tenders: vec![Tender {
                    method: PaymentMethod::Cash,
                    amount: dec("20"),
                }],
                actor_id: "u-1".into(),
                at: 5,
            },
        )
        .await
        .unwrap();
        assert!(settled);
        assert_eq!(expected_cash(&db.pool, shift_id).await.unwrap(), dec("118"));

        assert_eq!(close(&db.pool, &closing(shift_id, "117.5")).await.unwrap(), Some(dec("118")));
        assert_eq!(close(&db.pool, &closing(shift_id, "117.5")).await.unwrap(), None);

        let shift = find_by_id(&db.pool, shift_id).await.unwrap().unwrap();
        assert_eq!(shift.status, ShiftStatus::Closed);
        assert_eq!(shift.expected_cash, Some(dec("118")));
        assert_eq!(shift.cash_difference, Some(dec("-0.5")));
        assert_eq!(shift.closed_by.as_deref(), Some("u-1"));
        assert!(find_open_for_cashier(&db.pool, "u-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expected_cash_unknown_shift() {
        let db = setup().await;
        assert!(matches!(
            expected_cash(&db.pool, 404).await,
            Err(RepoError::NotFound(_))
        ));
    }
}
