//! Order model
//!
//! ```text
//! pending --accept--> open --hold--> held --resume--> open
//! open --pay--> paid
//! open|held --void--> voided
//! pending --reject--> cancelled
//! paid|closed --refund--> (unchanged, refund appended)
//! ```

use super::UnknownVariant;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OrderStatus {
    /// Submitted (e.g. by QR) and waiting for a cashier
    Pending,
    Open,
    Held,
    Paid,
    /// Settled and archived; treated like `Paid`
    Closed,
    Voided,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Open => "open",
            Self::Held => "held",
            Self::Paid => "paid",
            Self::Closed => "closed",
            Self::Voided => "voided",
            Self::Cancelled => "cancelled",
        }
    }

    /// Settled orders: items and totals are frozen
    pub fn is_finalized(&self) -> bool {
        matches!(self, Self::Paid | Self::Closed)
    }

    /// Orders still occupying a cashier's shift
    pub fn is_unsettled(&self) -> bool {
        matches!(self, Self::Open | Self::Held)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "open" => Ok(Self::Open),
            "held" => Ok(Self::Held),
            "paid" => Ok(Self::Paid),
            "closed" => Ok(Self::Closed),
            "voided" => Ok(Self::Voided),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownVariant {
                kind: "order status",
                value: other.to_string(),
            }),
        }
    }
}

/// Line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub name: String,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    pub voided: bool,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Principal mutable entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub restaurant_id: i64,
    pub branch_id: i64,
    pub table_id: Option<i64>,
    /// Set once the order is accepted into a cashier's workflow
    pub shift_id: Option<i64>,
    pub status: OrderStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    /// Sum of refunds issued against this order
    #[serde(with = "rust_decimal::serde::float")]
    pub refunded: Decimal,
    /// Cash change handed back at payment
    #[serde(with = "rust_decimal::serde::float")]
    pub change_given: Decimal,
    pub reason: Option<String>,
    pub items: Vec<OrderItem>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// An order is empty iff it has no non-voided items
    pub fn is_empty(&self) -> bool {
        !self.items.iter().any(|item| !item.voided)
    }

    /// Amount that may still be refunded
    pub fn refundable(&self) -> Decimal {
        (self.total - self.refunded).max(Decimal::ZERO)
    }

    pub fn item(&self, item_id: i64) -> Option<&OrderItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Minimal public projection returned to callers
    pub fn projection(&self) -> OrderProjection {
        OrderProjection {
            id: self.id,
            status: self.status,
            branch_id: self.branch_id,
            table_id: self.table_id,
            shift_id: self.shift_id,
            total: self.total,
            refunded: self.refunded,
            item_count: self.items.iter().filter(|item| !item.voided).count(),
            updated_at: self.updated_at,
        }
    }
}

/// Minimal public projection of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderProjection {
    pub id: i64,
    pub status: OrderStatus,
    pub branch_id: i64,
    pub table_id: Option<i64>,
    pub shift_id: Option<i64>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub refunded: Decimal,
    pub item_count: usize,
    pub updated_at: i64,
}
