//! Snapshot of the facts invariants are evaluated against

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{OrderStatus, ShiftStatus};

use crate::actions::ActionId;

/// Facts known about a request at evaluation time
///
/// Every field is optional. An absent fact means the invariant that reads it
/// does not apply, and the invariant holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvariantContext {
    /// Action being attempted
    pub action: Option<ActionId>,

    // Tenant
    pub restaurant_active: Option<bool>,
    pub subscription_valid: Option<bool>,

    // Module flags
    pub qr_ordering_enabled: Option<bool>,
    pub kitchen_display_enabled: Option<bool>,
    pub inventory_enabled: Option<bool>,

    // Order
    pub order_status: Option<OrderStatus>,
    /// No non-voided items
    pub order_empty: Option<bool>,

    // Shift
    /// The shift that would settle this payment exists and is open
    pub shift_open: Option<bool>,
    /// Status of the shift being closed
    pub shift_status: Option<ShiftStatus>,
    /// The caller already has an open shift
    pub cashier_has_open_shift: Option<bool>,
    /// Open or held orders still attached to the shift
    pub unsettled_orders_in_shift: Option<u32>,
    /// Counted minus expected cash
    pub cash_difference: Option<Decimal>,

    // Payment
    /// Balance left after the tendered payments
    pub payment_remaining: Option<Decimal>,
    /// Tendered more than the total with at least one non-cash method
    pub non_cash_overpayment: Option<bool>,
    pub refund_amount: Option<Decimal>,
    /// Order total minus refunds already issued
    pub refundable: Option<Decimal>,
}

impl InvariantContext {
    pub fn for_action(action: ActionId) -> Self {
        Self {
            action: Some(action),
            ..Default::default()
        }
    }
}
