//! Split a bill across tendered payments

use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::PaymentMethod;
use shared::request::TenderInput;
use thiserror::Error;

use crate::utils::money;

/// One tender after validation and rounding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tender {
    pub method: PaymentMethod,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Allocation of an order total across tenders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSplit {
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_paid: Decimal,
    /// `max(0, total - total_paid)`
    #[serde(with = "rust_decimal::serde::float")]
    pub remaining: Decimal,
    /// `max(0, total_paid - total)`, returned as change (cash only)
    #[serde(with = "rust_decimal::serde::float")]
    pub overpayment: Decimal,
    pub tenders: Vec<Tender>,
}

impl PaymentSplit {
    /// Tendered amount covers the total
    pub fn is_settled(&self) -> bool {
        self.remaining.is_zero()
    }

    /// Sum of the cash tenders
    pub fn cash_tendered(&self) -> Decimal {
        self.tenders
            .iter()
            .filter(|t| t.method.is_cash())
            .map(|t| t.amount)
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("At least one payment is required")]
    EmptyTender,

    #[error("payments[{index}]: {message}")]
    InvalidAmount { index: usize, message: String },

    /// Overpaid with at least one non-cash tender
    #[error("Non-cash payments must be exact: paid {total_paid}, overpaid by {overpayment}")]
    NonCashOverpayment {
        total_paid: Decimal,
        overpayment: Decimal,
    },
}

/// Split `total` across `tenders`
///
/// Every amount is rounded to three places half-up before summing. Any
/// overpayment is change due, which only cash can produce: if the tenders
/// overpay and any of them is not cash, the split is rejected. A mixed
/// cash and card overpayment is rejected as well.
pub fn calculate(total: Decimal, tenders: &[TenderInput]) -> Result<PaymentSplit, SplitError> {
    if tenders.is_empty() {
        return Err(SplitError::EmptyTender);
    }

    let total = money::round(total);
    let tenders = tenders
        .iter()
        .enumerate()
        .map(|(index, input)| {
            money::validate_positive(input.amount, "amount")
                .map(|amount| Tender {
                    method: input.method,
                    amount,
                })
                .map_err(|message| SplitError::InvalidAmount { index, message })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let total_paid: Decimal = tenders.iter().map(|t| t.amount).sum();
    let remaining = (total - total_paid).max(Decimal::ZERO);
    let overpayment = (total_paid - total).max(Decimal::ZERO);

    if overpayment > Decimal::ZERO && tenders.iter().any(|t| !t.method.is_cash()) {
        return Err(SplitError::NonCashOverpayment {
            total_paid,
            overpayment,
        });
    }

    Ok(PaymentSplit {
        total,
        total_paid,
        remaining,
        overpayment,
        tenders,
    })
}
