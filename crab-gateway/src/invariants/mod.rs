//! Invariant Registry
//!
//! A static table of named business rules. Each rule is a pure predicate over
//! an [`InvariantContext`]; re-evaluating the same snapshot always gives the
//! same answer. The gateway uses the table to block transitions and the
//! diagnostic reasoner uses the same table to explain them, so rule text lives
//! here and nowhere else.
//!
//! Severity [`Severity::Blocking`] rejects the action; [`Severity::Warning`] is
//! reported alongside a successful response and never blocks.

mod context;
mod table;

pub use context::InvariantContext;

use serde::Serialize;
use shared::response::WarningNotice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvariantCategory {
    Tenant,
    Module,
    Order,
    Shift,
    Payment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Blocking,
    Warning,
}

/// A named, always-must-hold business rule
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invariant {
    pub id: &'static str,
    pub category: InvariantCategory,
    pub severity: Severity,
    /// Human-readable rule, surfaced verbatim in rejections
    pub rule: &'static str,
    /// What the user can do about it
    pub remediation: &'static str,
    /// Returns `true` when the rule holds
    #[serde(skip)]
    pub check: fn(&InvariantContext) -> bool,
}

impl Invariant {
    pub fn holds(&self, ctx: &InvariantContext) -> bool {
        (self.check)(ctx)
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Blocking
    }

    pub fn warning_notice(&self) -> WarningNotice {
        WarningNotice {
            id: self.id.to_string(),
            rule: self.rule.to_string(),
        }
    }
}

/// All registered invariants, in registration order
pub fn all() -> &'static [Invariant] {
    table::INVARIANTS
}

pub fn get(id: &str) -> Option<&'static Invariant> {
    table::INVARIANTS.iter().find(|inv| inv.id == id)
}

/// Evaluate one invariant; `None` for an unknown id
pub fn evaluate(id: &str, ctx: &InvariantContext) -> Option<bool> {
    get(id).map(|inv| inv.holds(ctx))
}

/// Outcome of evaluating an ordered set of invariants
#[derive(Debug, Default)]
pub struct Evaluation {
    /// Failed blocking invariants, in the order given
    pub blocking: Vec<&'static Invariant>,
    /// Failed warning invariants, in the order given
    pub warnings: Vec<&'static Invariant>,
}

impl Evaluation {
    pub fn first_blocking(&self) -> Option<&'static Invariant> {
        self.blocking.first().copied()
    }

    pub fn is_blocked(&self) -> bool {
        !self.blocking.is_empty()
    }

    pub fn warning_notices(&self) -> Vec<WarningNotice> {
        self.warnings.iter().map(|inv| inv.warning_notice()).collect()
    }
}

/// Evaluate `ids` in order against one snapshot
///
/// Unknown ids are skipped and logged; the descriptor table is checked
/// against the registry in tests.
pub fn evaluate_all(ids: &[&str], ctx: &InvariantContext) -> Evaluation {
    let mut evaluation = Evaluation::default();
    for id in ids {
        let Some(inv) = get(id) else {
            tracing::error!(invariant = %id, "Unknown invariant referenced");
            continue;
        };
        if inv.holds(ctx) {
            continue;
        }
        match inv.severity {
            Severity::Blocking => evaluation.blocking.push(inv),
            Severity::Warning => evaluation.warnings.push(inv),
        }
    }
    evaluation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionId;
    use rust_decimal::Decimal;
    use shared::models::{OrderStatus, ShiftStatus};
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<_> = all().iter().map(|inv| inv.id).collect();
        assert_eq!(ids.len(), all().len());
    }

    #[test]
    fn test_every_invariant_has_text() {
        for inv in all() {
            assert!(!inv.rule.is_empty(), "{} has no rule text", inv.id);
            assert!(!inv.remediation.is_empty(), "{} has no remediation", inv.id);
        }
    }

    #[test]
    fn test_unknown_id() {
        assert_eq!(evaluate("no_such_rule", &InvariantContext::default()), None);
    }

    #[test]
    fn test_empty_context_satisfies_everything() {
        let ctx = InvariantContext::default();
        for inv in all() {
            assert!(inv.holds(&ctx), "{} failed on an empty context", inv.id);
        }
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let ctx = InvariantContext {
            action: Some(ActionId::CompletePayment),
            order_status: Some(OrderStatus::Held),
            ..Default::default()
        };
        let first = evaluate("order_not_held_for_payment", &ctx);
        for _ in 0..3 {
            assert_eq!(evaluate("order_not_held_for_payment", &ctx), first);
        }
        assert_eq!(first, Some(false));
    }

    #[test]
    fn test_held_blocks_payment_only() {
        let mut ctx = InvariantContext {
            action: Some(ActionId::CompletePayment),
            order_status: Some(OrderStatus::Held),
            ..Default::default()
        };
        assert_eq!(evaluate("order_not_held_for_payment", &ctx), Some(false));

        ctx.action = Some(ActionId::ResumeOrder);
        assert_eq!(evaluate("order_not_held_for_payment", &ctx), Some(true));
    }

    #[test]
    fn test_finalized_order_is_immutable_but_refundable() {
        let mut ctx = InvariantContext {
            action: Some(ActionId::VoidItem),
            order_status: Some(OrderStatus::Closed),
            ..Default::default()
        };
        assert_eq!(evaluate("order_finalized_immutable", &ctx), Some(false));

        ctx.action = Some(ActionId::RefundOrder);
        assert_eq!(evaluate("order_finalized_immutable", &ctx), Some(true));
    }

    #[test]
    fn test_transition_follows_lifecycle() {
        let mut ctx = InvariantContext {
            action: Some(ActionId::AcceptOrder),
            order_status: Some(OrderStatus::Pending),
            ..Default::default()
        };
        assert_eq!(evaluate("order_transition_allowed", &ctx), Some(true));

        ctx.order_status = Some(OrderStatus::Open);
        assert_eq!(evaluate("order_transition_allowed", &ctx), Some(false));

        // Shift actions are outside the order lifecycle
        ctx.action = Some(ActionId::CloseShift);
        assert_eq!(evaluate("order_transition_allowed", &ctx), Some(true));
    }

    #[test]
    fn test_shift_rules() {
        let ctx = InvariantContext {
            shift_status: Some(ShiftStatus::Closed),
            unsettled_orders_in_shift: Some(2),
            cashier_has_open_shift: Some(true),
            cash_difference: Some(Decimal::new(-500, 3)),
            ..Default::default()
        };
        assert_eq!(evaluate("shift_is_open", &ctx), Some(false));
        assert_eq!(evaluate("shift_no_open_orders", &ctx), Some(false));
        assert_eq!(evaluate("single_open_shift_per_cashier", &ctx), Some(false));
        assert_eq!(evaluate("shift_cash_balanced", &ctx), Some(false));
    }

    #[test]
    fn test_refund_within_total() {
        let mut ctx = InvariantContext {
            refund_amount: Some(Decimal::new(5_000, 3)),
            refundable: Some(Decimal::new(5_000, 3)),
            ..Default::default()
        };
        assert_eq!(evaluate("refund_within_total", &ctx), Some(true));

        ctx.refund_amount = Some(Decimal::new(5_001, 3));
        assert_eq!(evaluate("refund_within_total", &ctx), Some(false));
    }

    #[test]
    fn test_evaluate_all_keeps_order_and_splits_severity() {
        let ctx = InvariantContext {
            action: Some(ActionId::CompletePayment),
            order_status: Some(OrderStatus::Held),
            order_empty: Some(true),
            inventory_enabled: Some(false),
            ..Default::default()
        };
        let evaluation = evaluate_all(
            &[
                "order_not_held_for_payment",
                "order_transition_allowed",
                "order_not_empty",
                "inventory_tracking_enabled",
            ],
            &ctx,
        );

        let blocking: Vec<_> = evaluation.blocking.iter().map(|inv| inv.id).collect();
        assert_eq!(
            blocking,
            vec!["order_not_held_for_payment", "order_transition_allowed", "order_not_empty"]
        );
        assert_eq!(evaluation.first_blocking().map(|inv| inv.id), Some("order_not_held_for_payment"));
        assert_eq!(evaluation.warning_notices()[0].id, "inventory_tracking_enabled");
    }

    #[test]
    fn test_context_deserializes_camel_case() {
        let json = r#"{"action":"complete_payment","orderStatus":"held","shiftOpen":true}"#;
        let ctx: InvariantContext = serde_json::from_str(json).unwrap();
        assert_eq!(ctx.action, Some(ActionId::CompletePayment));
        assert_eq!(ctx.order_status, Some(OrderStatus::Held));
        assert_eq!(ctx.shift_open, Some(true));
        assert_eq!(ctx.order_empty, None);
    }
}
