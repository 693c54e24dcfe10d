//! Registered invariants
//!
//! Append new rules here. Handlers never test these conditions inline: they
//! list the ids in the action descriptor and the gateway evaluates them.

use rust_decimal::Decimal;
use shared::models::{OrderStatus, ShiftStatus};

use super::{Invariant, InvariantCategory, InvariantContext, Severity};
use crate::actions::{ActionId, lifecycle};

pub(super) static INVARIANTS: &[Invariant] = &[
    // ── Tenant ──
    Invariant {
        id: "restaurant_active",
        category: InvariantCategory::Tenant,
        severity: Severity::Blocking,
        rule: "The restaurant must be active",
        remediation: "Ask the platform administrator to reactivate the restaurant",
        check: restaurant_active,
    },
    Invariant {
        id: "subscription_valid",
        category: InvariantCategory::Tenant,
        severity: Severity::Blocking,
        rule: "The restaurant's subscription must be within its validity window",
        remediation: "Renew the subscription from the billing settings",
        check: subscription_valid,
    },
    // ── Modules ──
    Invariant {
        id: "qr_ordering_enabled",
        category: InvariantCategory::Module,
        severity: Severity::Blocking,
        rule: "QR orders can only be accepted or rejected while QR ordering is enabled",
        remediation: "Enable the QR ordering module for this restaurant",
        check: qr_ordering_enabled,
    },
    Invariant {
        id: "kitchen_display_enabled",
        category: InvariantCategory::Module,
        severity: Severity::Warning,
        rule: "Kitchen display is disabled; items will not be routed to the kitchen screen",
        remediation: "Enable the kitchen display module or notify the kitchen manually",
        check: kitchen_display_enabled,
    },
    Invariant {
        id: "inventory_tracking_enabled",
        category: InvariantCategory::Module,
        severity: Severity::Warning,
        rule: "Inventory tracking is disabled; stock will not be deducted for this sale",
        remediation: "Enable the inventory module to track stock automatically",
        check: inventory_tracking_enabled,
    },
    // ── Order ──
    Invariant {
        id: "order_not_held_for_payment",
        category: InvariantCategory::Order,
        severity: Severity::Blocking,
        rule: "A held order cannot be paid",
        remediation: "Resume the order before taking payment",
        check: order_not_held_for_payment,
    },
    Invariant {
        id: "order_finalized_immutable",
        category: InvariantCategory::Order,
        severity: Severity::Blocking,
        rule: "A paid or closed order cannot be modified",
        remediation: "Issue a refund instead of changing a settled order",
        check: order_finalized_immutable,
    },
    Invariant {
        id: "order_transition_allowed",
        category: InvariantCategory::Order,
        severity: Severity::Blocking,
        rule: "The order's current status does not allow this action",
        remediation: "Reload the order and choose an action valid for its current status",
        check: order_transition_allowed,
    },
    Invariant {
        id: "order_not_empty",
        category: InvariantCategory::Order,
        severity: Severity::Blocking,
        rule: "An order with no items cannot be paid",
        remediation: "Add at least one item or void the order",
        check: order_not_empty,
    },
    // ── Shift ──
    Invariant {
        id: "shift_open_for_payment",
        category: InvariantCategory::Shift,
        severity: Severity::Blocking,
        rule: "A shift must be open to accept payment",
        remediation: "Open a shift before taking payment",
        check: shift_open_for_payment,
    },
    Invariant {
        id: "single_open_shift_per_cashier",
        category: InvariantCategory::Shift,
        severity: Severity::Blocking,
        rule: "A cashier can have only one open shift at a time",
        remediation: "Close the current shift before opening a new one",
        check: single_open_shift_per_cashier,
    },
    Invariant {
        id: "shift_is_open",
        category: InvariantCategory::Shift,
        severity: Severity::Blocking,
        rule: "Only an open shift can be closed",
        remediation: "Reload the shift; it has already been closed",
        check: shift_is_open,
    },
    Invariant {
        id: "shift_no_open_orders",
        category: InvariantCategory::Shift,
        severity: Severity::Blocking,
        rule: "A shift cannot be closed while it still has open or held orders",
        remediation: "Pay, void or move the remaining orders before closing the shift",
        check: shift_no_open_orders,
    },
    Invariant {
        id: "shift_cash_balanced",
        category: InvariantCategory::Shift,
        severity: Severity::Warning,
        rule: "Counted cash does not match the expected drawer balance",
        remediation: "Recount the drawer and record the reason for the difference",
        check: shift_cash_balanced,
    },
    // ── Payment ──
    Invariant {
        id: "payment_covers_total",
        category: InvariantCategory::Payment,
        severity: Severity::Blocking,
        rule: "Tendered payments must cover the order total",
        remediation: "Add another payment for the remaining balance",
        check: payment_covers_total,
    },
    Invariant {
        id: "non_cash_exact_tender",
        category: InvariantCategory::Payment,
        severity: Severity::Blocking,
        rule: "Non-cash payments must be exact; only cash can produce change",
        remediation: "Reduce the card, mobile or voucher amount to the remaining balance",
        check: non_cash_exact_tender,
    },
    Invariant {
        id: "refund_within_total",
        category: InvariantCategory::Payment,
        severity: Severity::Blocking,
        rule: "Total refunds can never exceed the order total",
        remediation: "Refund at most the amount not yet refunded",
        check: refund_within_total,
    },
];

fn restaurant_active(ctx: &InvariantContext) -> bool {
    ctx.restaurant_active != Some(false)
}

fn subscription_valid(ctx: &InvariantContext) -> bool {
    ctx.subscription_valid != Some(false)
}

fn qr_ordering_enabled(ctx: &InvariantContext) -> bool {
    ctx.qr_ordering_enabled != Some(false)
}

fn kitchen_display_enabled(ctx: &InvariantContext) -> bool {
    ctx.kitchen_display_enabled != Some(false)
}

fn inventory_tracking_enabled(ctx: &InvariantContext) -> bool {
    ctx.inventory_enabled != Some(false)
}

fn order_not_held_for_payment(ctx: &InvariantContext) -> bool {
    let paying = ctx.action.is_none_or(|a| a == ActionId::CompletePayment);
    !(paying && ctx.order_status == Some(OrderStatus::Held))
}

fn order_finalized_immutable(ctx: &InvariantContext) -> bool {
    let (Some(action), Some(status)) = (ctx.action, ctx.order_status) else {
        return true;
    };
    // Refunds append a record without modifying the order
    !(status.is_finalized() && action.mutates_order())
}

fn order_transition_allowed(ctx: &InvariantContext) -> bool {
    match (ctx.action, ctx.order_status) {
        (Some(action), Some(status)) if action.targets_order() => {
            lifecycle::allows(action, status)
        }
        _ => true,
    }
}

fn order_not_empty(ctx: &InvariantContext) -> bool {
    ctx.order_empty != Some(true)
}

fn shift_open_for_payment(ctx: &InvariantContext) -> bool {
    ctx.shift_open != Some(false)
}

fn single_open_shift_per_cashier(ctx: &InvariantContext) -> bool {
    ctx.cashier_has_open_shift != Some(true)
}

fn shift_is_open(ctx: &InvariantContext) -> bool {
    ctx.shift_status != Some(ShiftStatus::Closed)
}

fn shift_no_open_orders(ctx: &InvariantContext) -> bool {
    ctx.unsettled_orders_in_shift.unwrap_or(0) == 0
}

fn shift_cash_balanced(ctx: &InvariantContext) -> bool {
    ctx.cash_difference.is_none_or(|d| d.is_zero())
}

fn payment_covers_total(ctx: &InvariantContext) -> bool {
    ctx.payment_remaining.is_none_or(|r| r <= Decimal::ZERO)
}

fn non_cash_exact_tender(ctx: &InvariantContext) -> bool {
    ctx.non_cash_overpayment != Some(true)
}

fn refund_within_total(ctx: &InvariantContext) -> bool {
    match (ctx.refund_amount, ctx.refundable) {
        (Some(amount), Some(refundable)) => amount <= refundable,
        _ => true,
    }
}
