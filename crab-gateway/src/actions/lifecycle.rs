//! Order lifecycle
//!
//! ```text
//! pending --accept--> open --hold--> held --resume--> open
//! open --pay--> paid
//! open|held --void--> voided
//! pending --reject--> cancelled
//! paid|closed --refund--> (unchanged)
//! open|held --void_item--> (unchanged)
//! ```

use shared::models::OrderStatus;

use super::ActionId;

/// Status an order moves to when `action` is applied in status `from`
///
/// `None` when the action is not allowed from `from`, or is not an order action.
pub fn next_status(action: ActionId, from: OrderStatus) -> Option<OrderStatus> {
    use OrderStatus::*;

    match (action, from) {
        (ActionId::AcceptOrder, Pending) => Some(Open),
        (ActionId::RejectOrder, Pending) => Some(Cancelled),
        (ActionId::HoldOrder, Open) => Some(Held),
        (ActionId::ResumeOrder, Held) => Some(Open),
        (ActionId::VoidOrder, Open | Held) => Some(Voided),
        (ActionId::VoidItem, Open | Held) => Some(from),
        (ActionId::CompletePayment, Open) => Some(Paid),
        (ActionId::RefundOrder, Paid | Closed) => Some(from),
        _ => None,
    }
}

pub fn allows(action: ActionId, from: OrderStatus) -> bool {
    next_status(action, from).is_some()
}
