//! Store traits the gateway is written against
//!
//! The gateway never issues SQL itself. It reads through these traits and
//! commits through conditional writes that report `Ok(false)` when the row no
//! longer matches what the caller observed. [`SqliteStore`] implements all of
//! them over one pool; tests substitute their own implementations.

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{Branch, Order, OrderStatus, Restaurant, Shift, StaffRoleAssignment};
use sqlx::SqlitePool;

use super::repository::{self, RepoResult};
use crate::audit::AuditEntry;
use crate::payment::Tender;

/// Move an order between two lifecycle statuses
#[derive(Debug, Clone)]
pub struct StatusTransition {
    pub order_id: i64,
    pub from: OrderStatus,
    pub to: OrderStatus,
    /// Attach the order to this shift (kept as-is when `None`)
    pub shift_id: Option<i64>,
    pub reason: Option<String>,
    pub at: i64,
}

#[derive(Debug, Clone)]
pub struct ItemVoid {
    pub order_id: i64,
    pub item_id: i64,
    pub expected_status: OrderStatus,
    pub at: i64,
}

/// Settle an open order against an open shift
#[derive(Debug, Clone)]
pub struct Settlement {
    pub order_id: i64,
    pub shift_id: i64,
    /// Total the tenders were split against
    pub expected_total: Decimal,
    pub change: Decimal,
    pub tenders: Vec<Tender>,
    pub actor_id: String,
    pub at: i64,
}

#[derive(Debug, Clone)]
pub struct RefundWrite {
    pub order_id: i64,
    pub expected_status: OrderStatus,
    pub expected_refunded: Decimal,
    pub amount: Decimal,
    pub reason: String,
    pub actor_id: String,
    pub at: i64,
}

#[derive(Debug, Clone)]
pub struct NewShift {
    pub restaurant_id: i64,
    pub branch_id: i64,
    pub cashier_id: String,
    pub opening_cash: Decimal,
    pub note: Option<String>,
    pub at: i64,
}

#[derive(Debug, Clone)]
pub struct ShiftClosing {
    pub shift_id: i64,
    pub closing_cash: Decimal,
    pub closed_by: String,
    pub note: Option<String>,
    pub at: i64,
}

/// Role resolution and tenant lookups
#[async_trait]
pub trait TenantStore: Send + Sync {
    async fn find_active_assignment(&self, user_id: &str) -> RepoResult<Option<StaffRoleAssignment>>;
    async fn find_restaurant(&self, id: i64) -> RepoResult<Option<Restaurant>>;
    async fn find_branch(&self, id: i64) -> RepoResult<Option<Branch>>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn find_order(&self, id: i64) -> RepoResult<Option<Order>>;
    async fn transition(&self, write: &StatusTransition) -> RepoResult<bool>;
    async fn void_item(&self, write: &ItemVoid) -> RepoResult<bool>;
    async fn settle(&self, write: &Settlement) -> RepoResult<bool>;
    async fn refund(&self, write: &RefundWrite) -> RepoResult<bool>;
}

#[async_trait]
pub trait ShiftStore: Send + Sync {
    async fn find_shift(&self, id: i64) -> RepoResult<Option<Shift>>;
    async fn find_open_shift_for(&self, cashier_id: &str) -> RepoResult<Option<Shift>>;
    async fn count_unsettled_orders(&self, shift_id: i64) -> RepoResult<u32>;
    async fn expected_cash(&self, shift_id: i64) -> RepoResult<Decimal>;
    /// `None` when the cashier already has an open shift
    async fn open_shift(&self, write: &NewShift) -> RepoResult<Option<i64>>;
    async fn close_shift(&self, write: &ShiftClosing) -> RepoResult<Option<Decimal>>;
}

/// Append-only audit destination
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, entry: &AuditEntry) -> RepoResult<i64>;
}

/// All stores over one SQLite pool
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantStore for SqliteStore {
    async fn find_active_assignment(&self, user_id: &str) -> RepoResult<Option<StaffRoleAssignment>> {
        repository::tenant::find_active_assignment(&self.pool, user_id).await
    }

    async fn find_restaurant(&self, id: i64) -> RepoResult<Option<Restaurant>> {
        repository::tenant::find_restaurant(&self.pool, id).await
    }

    async fn find_branch(&self, id: i64) -> RepoResult<Option<Branch>> {
        repository::tenant::find_branch(&self.pool, id).await
    }
}

#[async_trait]
impl OrderStore for SqliteStore {
    async fn find_order(&self, id: i64) -> RepoResult<Option<Order>> {
        repository::order::find_by_id(&self.pool, id).await
    }

    async fn transition(&self, write: &StatusTransition) -> RepoResult<bool> {
        repository::order::transition(&self.pool, write).await
    }

    async fn void_item(&self, write: &ItemVoid) -> RepoResult<bool> {
        repository::order::void_item(&self.pool, write).await
    }

    async fn settle(&self, write: &Settlement) -> RepoResult<bool> {
        repository::order::settle(&self.pool, write).await
    }

    async fn refund(&self, write: &RefundWrite) -> RepoResult<bool> {
        repository::order::refund(&self.pool, write).await
    }
}

#[async_trait]
impl ShiftStore for SqliteStore {
    async fn find_shift(&self, id: i64) -> RepoResult<Option<Shift>> {
        repository::shift::find_by_id(&self.pool, id).await
    }

    async fn find_open_shift_for(&self, cashier_id: &str) -> RepoResult<Option<Shift>> {
        repository::shift::find_open_for_cashier(&self.pool, cashier_id).await
    }

    async fn count_unsettled_orders(&self, shift_id: i64) -> RepoResult<u32> {
        repository::shift::count_unsettled_orders(&self.pool, shift_id).await
    }

    async fn expected_cash(&self, shift_id: i64) -> RepoResult<Decimal> {
        repository::shift::expected_cash(&self.pool, shift_id).await
    }

    async fn open_shift(&self, write: &NewShift) -> RepoResult<Option<i64>> {
        repository::shift::open(&self.pool, write).await
    }

    async fn close_shift(&self, write: &ShiftClosing) -> RepoResult<Option<Decimal>> {
        repository::shift::close(&self.pool, write).await
    }
}

#[async_trait]
impl AuditSink for SqliteStore {
    async fn append(&self, entry: &AuditEntry) -> RepoResult<i64> {
        repository::audit::append(&self.pool, entry).await
    }
}
