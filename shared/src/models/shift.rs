//! Shift model (班次管理)
//!
//! One cashier's open drawer session. At most one shift per cashier may be
//! `open`; closing it reconciles counted cash against expected cash.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Shift status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum ShiftStatus {
    #[default]
    Open,
    Closed,
}

impl ShiftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// Shift record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: i64,
    pub restaurant_id: i64,
    pub branch_id: i64,
    /// User id of the cashier owning the drawer
    pub cashier_id: String,
    pub status: ShiftStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub opening_cash: Decimal,
    /// Cash counted at close
    #[serde(with = "rust_decimal::serde::float_option")]
    pub closing_cash: Option<Decimal>,
    /// Opening cash plus cash taken minus change given
    #[serde(with = "rust_decimal::serde::float_option")]
    pub expected_cash: Option<Decimal>,
    /// Counted minus expected
    #[serde(with = "rust_decimal::serde::float_option")]
    pub cash_difference: Option<Decimal>,
    pub opened_at: i64,
    pub closed_at: Option<i64>,
    pub closed_by: Option<String>,
    pub note: Option<String>,
}

impl Shift {
    pub fn is_open(&self) -> bool {
        self.status == ShiftStatus::Open
    }
}
