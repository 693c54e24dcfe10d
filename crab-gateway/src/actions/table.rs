//! Descriptor table

use shared::models::StaffRole::{self, Cashier, Kitchen, Owner, SystemAdmin};
use shared::request::EntityKind;

use super::{ActionDescriptor, ActionId, SideEffect};

const FRONT_OF_HOUSE: &[StaffRole] = &[Cashier, Owner];
const MANAGEMENT: &[StaffRole] = &[Owner, SystemAdmin];

static ACCEPT_ORDER: ActionDescriptor = ActionDescriptor {
    id: ActionId::AcceptOrder,
    target: EntityKind::Order,
    allowed_roles: FRONT_OF_HOUSE,
    preconditions: &["order is pending"],
    postconditions: &["order is open", "order is attached to the caller's open shift, if any"],
    side_effects: &[SideEffect::Audit, SideEffect::KitchenDisplay],
    related_invariants: &[
        "restaurant_active",
        "subscription_valid",
        "qr_ordering_enabled",
        "order_transition_allowed",
        "kitchen_display_enabled",
    ],
};

static REJECT_ORDER: ActionDescriptor = ActionDescriptor {
    id: ActionId::RejectOrder,
    target: EntityKind::Order,
    allowed_roles: FRONT_OF_HOUSE,
    preconditions: &["order is pending", "a reason is given"],
    postconditions: &["order is cancelled"],
    side_effects: &[SideEffect::Audit],
    related_invariants: &[
        "restaurant_active",
        "subscription_valid",
        "qr_ordering_enabled",
        "order_transition_allowed",
    ],
};

static HOLD_ORDER: ActionDescriptor = ActionDescriptor {
    id: ActionId::HoldOrder,
    target: EntityKind::Order,
    allowed_roles: FRONT_OF_HOUSE,
    preconditions: &["order is open"],
    postconditions: &["order is held"],
    side_effects: &[SideEffect::Audit],
    related_invariants: &[
        "restaurant_active",
        "subscription_valid",
        "order_finalized_immutable",
        "order_transition_allowed",
    ],
};

static RESUME_ORDER: ActionDescriptor = ActionDescriptor {
    id: ActionId::ResumeOrder,
    target: EntityKind::Order,
    allowed_roles: FRONT_OF_HOUSE,
    preconditions: &["order is held"],
    postconditions: &["order is open"],
    side_effects: &[SideEffect::Audit],
    related_invariants: &[
        "restaurant_active",
        "subscription_valid",
        "order_finalized_immutable",
        "order_transition_allowed",
    ],
};

static VOID_ORDER: ActionDescriptor = ActionDescriptor {
    id: ActionId::VoidOrder,
    target: EntityKind::Order,
    allowed_roles: MANAGEMENT,
    preconditions: &["order is open or held", "a reason is given"],
    postconditions: &["order is voided"],
    side_effects: &[SideEffect::Audit, SideEffect::KitchenDisplay],
    related_invariants: &[
        "restaurant_active",
        "subscription_valid",
        "order_finalized_immutable",
        "order_transition_allowed",
    ],
};

static VOID_ITEM: ActionDescriptor = ActionDescriptor {
    id: ActionId::VoidItem,
    target: EntityKind::Order,
    allowed_roles: &[Cashier, Owner, Kitchen],
    preconditions: &["order is open or held", "item belongs to the order and is not voided"],
    postconditions: &["item is voided", "order total excludes the item"],
    side_effects: &[SideEffect::Audit, SideEffect::KitchenDisplay],
    related_invariants: &[
        "restaurant_active",
        "subscription_valid",
        "order_finalized_immutable",
        "order_transition_allowed",
        "kitchen_display_enabled",
    ],
};

static COMPLETE_PAYMENT: ActionDescriptor = ActionDescriptor {
    id: ActionId::CompletePayment,
    target: EntityKind::Order,
    allowed_roles: FRONT_OF_HOUSE,
    preconditions: &[
        "order is open and not empty",
        "a shift is open to settle the payment",
        "tendered payments cover the total",
    ],
    postconditions: &["order is paid", "payment records are appended"],
    side_effects: &[SideEffect::Audit, SideEffect::InventoryDeduction],
    related_invariants: &[
        "restaurant_active",
        "subscription_valid",
        "order_not_held_for_payment",
        "order_finalized_immutable",
        "order_transition_allowed",
        "order_not_empty",
        "shift_open_for_payment",
        "non_cash_exact_tender",
        "payment_covers_total",
        "inventory_tracking_enabled",
    ],
};

static REFUND_ORDER: ActionDescriptor = ActionDescriptor {
    id: ActionId::RefundOrder,
    target: EntityKind::Order,
    allowed_roles: MANAGEMENT,
    preconditions: &["order is paid or closed", "amount does not exceed the refundable balance"],
    postconditions: &["refund record is appended", "order status is unchanged"],
    side_effects: &[SideEffect::Audit],
    related_invariants: &[
        "restaurant_active",
        "subscription_valid",
        "order_transition_allowed",
        "refund_within_total",
    ],
};

static OPEN_SHIFT: ActionDescriptor = ActionDescriptor {
    id: ActionId::OpenShift,
    target: EntityKind::Branch,
    allowed_roles: FRONT_OF_HOUSE,
    preconditions: &["caller has no open shift"],
    postconditions: &["an open shift exists for the caller"],
    side_effects: &[SideEffect::Audit],
    related_invariants: &[
        "restaurant_active",
        "subscription_valid",
        "single_open_shift_per_cashier",
    ],
};

static CLOSE_SHIFT: ActionDescriptor = ActionDescriptor {
    id: ActionId::CloseShift,
    target: EntityKind::Shift,
    allowed_roles: FRONT_OF_HOUSE,
    preconditions: &["shift is open", "no open or held orders remain in the shift"],
    postconditions: &["shift is closed", "cash difference is recorded"],
    side_effects: &[SideEffect::Audit],
    related_invariants: &[
        "restaurant_active",
        "subscription_valid",
        "shift_is_open",
        "shift_no_open_orders",
        "shift_cash_balanced",
    ],
};

pub(super) static DESCRIPTORS: &[&ActionDescriptor] = &[
    &ACCEPT_ORDER,
    &REJECT_ORDER,
    &HOLD_ORDER,
    &RESUME_ORDER,
    &VOID_ORDER,
    &VOID_ITEM,
    &COMPLETE_PAYMENT,
    &REFUND_ORDER,
    &OPEN_SHIFT,
    &CLOSE_SHIFT,
];

pub(super) fn descriptor(action: ActionId) -> &'static ActionDescriptor {
    match action {
        ActionId::AcceptOrder => &ACCEPT_ORDER,
        ActionId::RejectOrder => &REJECT_ORDER,
        ActionId::HoldOrder => &HOLD_ORDER,
        ActionId::ResumeOrder => &RESUME_ORDER,
        ActionId::VoidOrder => &VOID_ORDER,
        ActionId::VoidItem => &VOID_ITEM,
        ActionId::CompletePayment => &COMPLETE_PAYMENT,
        ActionId::RefundOrder => &REFUND_ORDER,
        ActionId::OpenShift => &OPEN_SHIFT,
        ActionId::CloseShift => &CLOSE_SHIFT,
    }
}
