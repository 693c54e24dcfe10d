//! Action Descriptor Table
//!
//! Single source of truth correlating each user-invocable action with who may
//! perform it, which invariants can block it and which side effects follow a
//! successful commit. The gateway and the diagnostic reasoner both read it.

pub mod lifecycle;
mod table;

use serde::{Deserialize, Serialize};
use shared::models::StaffRole;
use shared::request::EntityKind;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionId {
    AcceptOrder,
    RejectOrder,
    HoldOrder,
    ResumeOrder,
    VoidOrder,
    VoidItem,
    CompletePayment,
    RefundOrder,
    OpenShift,
    CloseShift,
}

impl ActionId {
    pub const ALL: [ActionId; 10] = [
        Self::AcceptOrder,
        Self::RejectOrder,
        Self::HoldOrder,
        Self::ResumeOrder,
        Self::VoidOrder,
        Self::VoidItem,
        Self::CompletePayment,
        Self::RefundOrder,
        Self::OpenShift,
        Self::CloseShift,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AcceptOrder => "accept_order",
            Self::RejectOrder => "reject_order",
            Self::HoldOrder => "hold_order",
            Self::ResumeOrder => "resume_order",
            Self::VoidOrder => "void_order",
            Self::VoidItem => "void_item",
            Self::CompletePayment => "complete_payment",
            Self::RefundOrder => "refund_order",
            Self::OpenShift => "open_shift",
            Self::CloseShift => "close_shift",
        }
    }

    /// Actions whose target is an order
    pub fn targets_order(&self) -> bool {
        !matches!(self, Self::OpenShift | Self::CloseShift)
    }

    /// Order actions that change the order's status, items or totals
    pub fn mutates_order(&self) -> bool {
        self.targets_order() && *self != Self::RefundOrder
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effects triggered after a committed transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideEffect {
    /// Append an audit log entry
    Audit,
    /// Route (or withdraw) items on the kitchen display
    KitchenDisplay,
    /// Deduct stock for sold items
    InventoryDeduction,
}

/// Static description of one action
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDescriptor {
    pub id: ActionId,
    /// Kind of entity named by `targetEntityId`
    pub target: EntityKind,
    pub allowed_roles: &'static [StaffRole],
    pub preconditions: &'static [&'static str],
    pub postconditions: &'static [&'static str],
    pub side_effects: &'static [SideEffect],
    /// Invariants that can block or warn on this action, in evaluation order
    pub related_invariants: &'static [&'static str],
}

impl ActionDescriptor {
    pub fn allows_role(&self, role: StaffRole) -> bool {
        self.allowed_roles.contains(&role)
    }

    pub fn has_side_effect(&self, effect: SideEffect) -> bool {
        self.side_effects.contains(&effect)
    }

    pub fn relates_to(&self, invariant_id: &str) -> bool {
        self.related_invariants.contains(&invariant_id)
    }
}

/// Descriptor for `action`
pub fn resolve(action: ActionId) -> &'static ActionDescriptor {
    table::descriptor(action)
}

/// All descriptors in declaration order
pub fn all() -> &'static [&'static ActionDescriptor] {
    table::DESCRIPTORS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invariants;

    #[test]
    fn test_every_action_resolves_to_itself() {
        for action in ActionId::ALL {
            assert_eq!(resolve(action).id, action);
        }
        assert_eq!(all().len(), ActionId::ALL.len());
    }

    #[test]
    fn test_related_invariants_are_registered() {
        for descriptor in all() {
            for id in descriptor.related_invariants {
                assert!(
                    invariants::get(id).is_some(),
                    "{} references unknown invariant {id}",
                    descriptor.id
                );
            }
        }
    }

    #[test]
    fn test_tenant_rules_apply_to_every_action() {
        for descriptor in all() {
            assert!(descriptor.relates_to("restaurant_active"));
            assert!(descriptor.relates_to("subscription_valid"));
        }
    }

    #[test]
    fn test_every_action_is_audited() {
        for descriptor in all() {
            assert!(descriptor.has_side_effect(SideEffect::Audit), "{}", descriptor.id);
        }
    }

    #[test]
    fn test_role_matrix() {
        use StaffRole::*;

        let accept = resolve(ActionId::AcceptOrder);
        assert!(accept.allows_role(Cashier));
        assert!(!accept.allows_role(Kitchen));

        let void = resolve(ActionId::VoidOrder);
        assert!(void.allows_role(Owner));
        assert!(!void.allows_role(Cashier));

        let refund = resolve(ActionId::RefundOrder);
        assert!(refund.allows_role(SystemAdmin));
        assert!(!refund.allows_role(Cashier));
    }

    #[test]
    fn test_hold_rule_precedes_lifecycle_rule_for_payment() {
        let ids = resolve(ActionId::CompletePayment).related_invariants;
        let held = ids.iter().position(|id| *id == "order_not_held_for_payment").unwrap();
        let lifecycle = ids.iter().position(|id| *id == "order_transition_allowed").unwrap();
        assert!(held < lifecycle);
    }

    #[test]
    fn test_targets() {
        assert_eq!(resolve(ActionId::OpenShift).target, EntityKind::Branch);
        assert_eq!(resolve(ActionId::CloseShift).target, EntityKind::Shift);
        assert_eq!(resolve(ActionId::VoidItem).target, EntityKind::Order);
    }

    #[test]
    fn test_descriptor_serializes() {
        let json = serde_json::to_value(resolve(ActionId::CloseShift)).unwrap();
        assert_eq!(json["id"], "close_shift");
        assert_eq!(json["target"], "shift");
        assert_eq!(json["allowedRoles"][0], "cashier");
        assert!(json["relatedInvariants"].as_array().unwrap().len() > 2);
    }
}
