//! Order Repository
//!
//! Every status change is a conditional write: the `WHERE` clause carries the
//! status the caller observed, and zero affected rows means another writer
//! got there first. Callers get `Ok(false)` for that case, never an error.

use super::{RepoError, RepoResult, minor};
use crate::db::store::{ItemVoid, RefundWrite, Settlement, StatusTransition};
use crate::utils::money;
use rust_decimal::Decimal;
use shared::models::{Order, OrderItem, OrderStatus, Payment, PaymentMethod, Refund};
use sqlx::SqlitePool;

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    restaurant_id: i64,
    branch_id: i64,
    table_id: Option<i64>,
    shift_id: Option<i64>,
    status: OrderStatus,
    total_minor: i64,
    refunded_minor: i64,
    change_minor: i64,
    reason: Option<String>,
    created_at: i64,
    updated_at: i64,
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: i64,
    order_id: i64,
    name: String,
    quantity: i32,
    unit_price_minor: i64,
    voided: bool,
}

impl From<ItemRow> for OrderItem {
    fn from(row: ItemRow) -> Self {
        Self {
            id: row.id,
            order_id: row.order_id,
            name: row.name,
            quantity: row.quantity,
            unit_price: money::from_minor(row.unit_price_minor),
            voided: row.voided,
        }
    }
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            restaurant_id: self.restaurant_id,
            branch_id: self.branch_id,
            table_id: self.table_id,
            shift_id: self.shift_id,
            status: self.status,
            total: money::from_minor(self.total_minor),
            refunded: money::from_minor(self.refunded_minor),
            change_given: money::from_minor(self.change_minor),
            reason: self.reason,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Order to insert (fixtures and intake)
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub restaurant_id: i64,
    pub branch_id: i64,
    pub table_id: Option<i64>,
    pub shift_id: Option<i64>,
    pub status: OrderStatus,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, OrderRow>(
        "SELECT id, restaurant_id, branch_id, table_id, shift_id, status, total_minor, refunded_minor, change_minor, reason, created_at, updated_at FROM orders WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let items = sqlx::query_as::<_, ItemRow>(
        "SELECT id, order_id, name, quantity, unit_price_minor, voided FROM order_items WHERE order_id = ? ORDER BY position, id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(OrderItem::from)
    .collect();

    Ok(Some(row.into_order(items)))
}

pub async fn create(pool: &SqlitePool, data: &NewOrder) -> RepoResult<Order> {
    let mut total = Decimal::ZERO;
    for item in &data.items {
        if item.quantity <= 0 {
            return Err(RepoError::Validation(format!(
                "quantity must be positive, got {}",
                item.quantity
            )));
        }
        total += money::round(item.unit_price) * Decimal::from(item.quantity);
    }

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO orders (restaurant_id, branch_id, table_id, shift_id, status, total_minor, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7) RETURNING id",
    )
    .bind(data.restaurant_id)
    .bind(data.branch_id)
    .bind(data.table_id)
    .bind(data.shift_id)
    .bind(data.status)
    .bind(minor(total)?)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    for (position, item) in data.items.iter().enumerate() {
        sqlx::query(
            "INSERT INTO order_items (order_id, position, name, quantity, unit_price_minor) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(position as i64)
        .bind(&item.name)
        .bind(item.quantity)
        .bind(minor(item.unit_price)?)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create order".into()))
}

/// Move an order from `write.from` to `write.to`
///
/// When `write.shift_id` is set the shift must still be open at write time.
pub async fn transition(pool: &SqlitePool, write: &StatusTransition) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE orders SET status = ?1, shift_id = COALESCE(?2, shift_id), reason = COALESCE(?3, reason), updated_at = ?4 WHERE id = ?5 AND status = ?6 AND (?2 IS NULL OR EXISTS (SELECT 1 FROM shifts WHERE id = ?2 AND status = 'open'))",
    )
    .bind(write.to)
    .bind(write.shift_id)
    .bind(&write.reason)
    .bind(write.at)
    .bind(write.order_id)
    .bind(write.from)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Void one item and recompute the total from the remaining items
pub async fn void_item(pool: &SqlitePool, write: &ItemVoid) -> RepoResult<bool> {
    let mut tx = pool.begin().await?;

    let rows = sqlx::query(
        "UPDATE order_items SET voided = 1 WHERE id = ?1 AND order_id = ?2 AND voided = 0 AND EXISTS (SELECT 1 FROM orders WHERE id = ?2 AND status = ?3)",
    )
    .bind(write.item_id)
    .bind(write.order_id)
    .bind(write.expected_status)
    .execute(&mut *tx)
    .await?;

    if rows.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    sqlx::query(
        "UPDATE orders SET total_minor = (SELECT COALESCE(SUM(quantity * unit_price_minor), 0) FROM order_items WHERE order_id = ?1 AND voided = 0), updated_at = ?2 WHERE id = ?1 AND status = ?3",
    )
    .bind(write.order_id)
    .bind(write.at)
    .bind(write.expected_status)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(true)
}

/// Mark an open order paid and append its payments
///
/// The update only matches while the order is still open, its total is the
/// one the tenders were split against and the settling shift is still open.
pub async fn settle(pool: &SqlitePool, write: &Settlement) -> RepoResult<bool> {
    let mut tx = pool.begin().await?;

    let rows = sqlx::query(
        "UPDATE orders SET status = 'paid', shift_id = ?1, change_minor = ?2, updated_at = ?3 WHERE id = ?4 AND status = 'open' AND total_minor = ?5 AND EXISTS (SELECT 1 FROM shifts WHERE id = ?1 AND status = 'open')",
    )
    .bind(write.shift_id)
    .bind(minor(write.change)?)
    .bind(write.at)
    .bind(write.order_id)
    .bind(minor(write.expected_total)?)
    .execute(&mut *tx)
    .await?;

    if rows.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    for tender in &write.tenders {
        sqlx::query(
            "INSERT INTO payments (order_id, shift_id, method, amount_minor, created_by, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(write.order_id)
        .bind(write.shift_id)
        .bind(tender.method)
        .bind(minor(tender.amount)?)
        .bind(&write.actor_id)
        .bind(write.at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(true)
}

/// Compare-and-set on `refunded_minor`, then append the refund record
pub async fn refund(pool: &SqlitePool, write: &RefundWrite) -> RepoResult<bool> {
    let amount = minor(write.amount)?;
    let mut tx = pool.begin().await?;

    let rows = sqlx::query(
        "UPDATE orders SET refunded_minor = refunded_minor + ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4 AND refunded_minor = ?5 AND refunded_minor + ?1 <= total_minor",
    )
    .bind(amount)
    .bind(write.at)
    .bind(write.order_id)
    .bind(write.expected_status)
    .bind(minor(write.expected_refunded)?)
    .execute(&mut *tx)
    .await?;

    if rows.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    sqlx::query(
        "INSERT INTO refunds (order_id, amount_minor, reason, created_by, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(write.order_id)
    .bind(amount)
    .bind(&write.reason)
    .bind(&write.actor_id)
    .bind(write.at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(true)
}

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: i64,
    order_id: i64,
    shift_id: i64,
    method: PaymentMethod,
    amount_minor: i64,
    created_by: String,
    created_at: i64,
}

pub async fn payments_for(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<Payment>> {
    let rows = sqlx::query_as::<_, PaymentRow>(
        "SELECT id, order_id, shift_id, method, amount_minor, created_by, created_at FROM payments WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Payment {
            id: row.id,
            order_id: row.order_id,
            shift_id: row.shift_id,
            method: row.method,
            amount: money::from_minor(row.amount_minor),
            created_by: row.created_by,
            created_at: row.created_at,
        })
        .collect())
}

#[derive(sqlx::FromRow)]
struct RefundRow {
    id: i64,
    order_id: i64,
    amount_minor: i64,
    reason: String,
    created_by: String,
    created_at: i64,
}

pub async fn refunds_for(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<Refund>> {
    let rows = sqlx::query_as::<_, RefundRow>(
        "SELECT id, order_id, amount_minor, reason, created_by, created_at FROM refunds WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Refund {
            id: row.id,
            order_id: row.order_id,
            amount: money::from_minor(row.amount_minor),
            reason: row.reason,
            created_by: row.created_by,
            created_at: row.created_at,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::tenant;
    use crate::payment::Tender;
    use shared::models::{Branch, Restaurant};

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

    fn new_order(status: OrderStatus) -> NewOrder {
        NewOrder {
            restaurant_id: 1,
            branch_id: 10,
            table_id: Some(4),
            shift_id: None,
            status,
            items: vec![
                NewOrderItem {
                    name: "Paella".into(),
                    quantity: 2,
                    unit_price: dec("12.500"),
                },
                NewOrderItem {
                    name: "Agua".into(),
                    quantity: 1,
                    unit_price: dec("1.250"),
                },
            ],
        }
    }

    async fn open_shift(db: &DbService) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO shifts (restaurant_id, branch_id, cashier_id, status, opening_cash_minor, opened_at) VALUES (1, 10, 'u-1', 'open', 0, 0) RETURNING id",
        )
        .fetch_one(&db.pool)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_computes_total() {
        let db = setup().await;
        let order = create(&db.pool, &new_order(OrderStatus::Pending)).await.unwrap();
        assert_eq!(order.total, dec("26.250"));
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].name, "Paella");
        assert!(!order.is_empty());
    }

    #[tokio::test]
    async fn test_transition_requires_expected_status() {
        let db = setup().await;
        let order = create(&db.pool, &new_order(OrderStatus::Pending)).await.unwrap();
        let write = StatusTransition {
            order_id: order.id,
            from: OrderStatus::Pending,
            to: OrderStatus::Open,
            shift_id: None,
            reason: None,
            at: 1,
        };
        assert!(transition(&db.pool, &write).await.unwrap());
        // Second writer observed `pending` too and loses
        assert!(!transition(&db.pool, &write).await.unwrap());

        let order = find_by_id(&db.pool, order.id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Open);
    }

    #[tokio::test]
    async fn test_transition_refuses_closed_shift() {
        let db = setup().await;
        let shift_id = open_shift(&db).await;
        let order = create(&db.pool, &new_order(OrderStatus::Pending)).await.unwrap();
        sqlx::query("UPDATE shifts SET status = 'closed' WHERE id = ?")
            .bind(shift_id)
            .execute(&db.pool)
            .await
            .unwrap();

        let write = StatusTransition {
            order_id: order.id,
            from: OrderStatus::Pending,
            to: OrderStatus::Open,
            shift_id: Some(shift_id),
            reason: None,
            at: 1,
        };
        assert!(!transition(&db.pool, &write).await.unwrap());

        let order = find_by_id(&db.pool, order.id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.shift_id, None);
    }

    #[tokio::test]
    async fn test_void_item_recomputes_total() {
        let db = setup().await;
        let order = create(&db.pool, &new_order(OrderStatus::Open)).await.unwrap();
        let write = ItemVoid {
            order_id: order.id,
            item_id: order.items[0].id,
            expected_status: OrderStatus::Open,
            at: 1,
        };
        assert!(void_item(&db.pool, &write).await.unwrap());
        assert!(!void_item(&db.pool, &write).await.unwrap());

        let order = find_by_id(&db.pool, order.id).await.unwrap().unwrap();
        assert_eq!(order.total, dec("1.250"));
        assert!(order.items[0].voided);
    }

    #[tokio::test]
    async fn test_void_item_guarded_by_status() {
        let db = setup().await;
        let order = create(&db.pool, &new_order(OrderStatus::Paid)).await.unwrap();
        let write = ItemVoid {
            order_id: order.id,
            item_id: order.items[0].id,
            expected_status: OrderStatus::Open,
            at: 1,
        };
        assert!(!void_item(&db.pool, &write).await.unwrap());
        let order = find_by_id(&db.pool, order.id).await.unwrap().unwrap();
        assert!(!order.items[0].voided);
    }

    #[tokio::test]
    async fn test_settle_appends_payments() {
        let db = setup().await;
        let shift_id = open_shift(&db).await;
        let order = create(&db.pool, &new_order(OrderStatus::Open)).await.unwrap();
        let write = Settlement {
            order_id: order.id,
            shift_id,
            expected_total: order.total,
            change: dec("3.750"),
            tenders: vec![Tender {
                method: PaymentMethod::Cash,
                amount: dec("30"),
            }],
            actor_id: "u-1".into(),
            at: 2,
        };
        assert!(settle(&db.pool, &write).await.unwrap());
        assert!(!settle(&db.pool, &write).await.unwrap());

        let order = find_by_id(&db.pool, order.id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.shift_id, Some(shift_id));
        assert_eq!(order.change_given, dec("3.750"));
        let payments = payments_for(&db.pool, order.id).await.unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].amount, dec("30"));
    }

    #[tokio::test]
    async fn test_settle_rejects_stale_total_and_closed_shift() {
        let db = setup().await;
        let shift_id = open_shift(&db).await;
        let order = create(&db.pool, &new_order(OrderStatus::Open)).await.unwrap();
        let mut write = Settlement {
            order_id: order.id,
            shift_id,
            expected_total: dec("20"),
            change: Decimal::ZERO,
            tenders: vec![Tender {
                method: PaymentMethod::Card,
                amount: dec("20"),
            }],
            actor_id: "u-1".into(),
            at: 2,
        };
        assert!(!settle(&db.pool, &write).await.unwrap());

        sqlx::query("UPDATE shifts SET status = 'closed' WHERE id = ?")
            .bind(shift_id)
            .execute(&db.pool)
            .await
            .unwrap();
        write.expected_total = order.total;
        assert!(!settle(&db.pool, &write).await.unwrap());
        assert!(payments_for(&db.pool, order.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_refunds_never_exceed_total() {
        let db = setup().await;
        let order = create(&db.pool, &new_order(OrderStatus::Paid)).await.unwrap();
        let mut write = RefundWrite {
            order_id: order.id,
            expected_status: OrderStatus::Paid,
            expected_refunded: Decimal::ZERO,
            amount: dec("20"),
            reason: "cold".into(),
            actor_id: "u-2".into(),
            at: 3,
        };
        assert!(refund(&db.pool, &write).await.unwrap());

        // Stale `expected_refunded`
        assert!(!refund(&db.pool, &write).await.unwrap());

        // Over the remaining balance
        write.expected_refunded = dec("20");
        write.amount = dec("6.251");
        assert!(!refund(&db.pool, &write).await.unwrap());

        write.amount = dec("6.250");
        assert!(refund(&db.pool, &write).await.unwrap());

        let order = find_by_id(&db.pool, order.id).await.unwrap().unwrap();
        assert_eq!(order.refunded, order.total);
        let refunded: Decimal = refunds_for(&db.pool, order.id)
            .await
            .unwrap()
            .iter()
            .map(|r| r.amount)
            .sum();
        assert_eq!(refunded, order.total);
    }
}
