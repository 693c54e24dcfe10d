//! Order lifecycle handlers: accept, reject, hold, resume, void, void item

use serde_json::json;
use shared::error::{AppError, AppResult};
use shared::models::{Order, OrderProjection, OrderStatus};
use shared::request::{EntityKind, OrderActionRequest, ReasonRequest, VoidItemRequest};
use shared::response::ActionResponse;

use super::{Gateway, Scope, conflict, optional_text, required_text};
use crate::actions::{ActionId, lifecycle};
use crate::audit::{AuditAction, AuditEntry};
use crate::auth::Caller;
use crate::db::{ItemVoid, StatusTransition};

/// Status-only change of an order
struct Move {
    to: OrderStatus,
    shift_id: Option<i64>,
    reason: Option<String>,
    audit: AuditAction,
}

impl Gateway {
    /// pending → open, attached to the caller's open shift in the branch
    pub async fn accept_order(
        &self,
        caller: &Caller,
        req: OrderActionRequest,
    ) -> AppResult<ActionResponse<OrderProjection>> {
        let scope = self.enter(caller, ActionId::AcceptOrder, req.entity_type).await?;
        let order = self.load_order(&scope, req.target_entity_id).await?;

        let shift_id = self
            .shifts
            .find_open_shift_for(&caller.user_id)
            .await?
            .filter(|shift| shift.branch_id == order.branch_id)
            .map(|shift| shift.id);

        self.apply_move(
            scope,
            order,
            Move {
                to: OrderStatus::Open,
                shift_id,
                reason: None,
                audit: AuditAction::OrderAccepted,
            },
        )
        .await
    }

    /// pending → cancelled
    pub async fn reject_order(
        &self,
        caller: &Caller,
        req: ReasonRequest,
    ) -> AppResult<ActionResponse<OrderProjection>> {
        let scope = self.enter(caller, ActionId::RejectOrder, req.entity_type).await?;
        let reason = required_text(&req.reason, "reason")?;
        let order = self.load_order(&scope, req.target_entity_id).await?;
        self.apply_move(
            scope,
            order,
            Move {
                to: OrderStatus::Cancelled,
                shift_id: None,
                reason: Some(reason),
                audit: AuditAction::OrderRejected,
            },
        )
        .await
    }

    /// open → held
    pub async fn hold_order(
        &self,
        caller: &Caller,
        req: OrderActionRequest,
    ) -> AppResult<ActionResponse<OrderProjection>> {
        let scope = self.enter(caller, ActionId::HoldOrder, req.entity_type).await?;
        let order = self.load_order(&scope, req.target_entity_id).await?;
        self.apply_move(
            scope,
            order,
            Move {
                to: OrderStatus::Held,
                shift_id: None,
                reason: None,
                audit: AuditAction::OrderHeld,
            },
        )
        .await
    }

    /// held → open
    pub async fn resume_order(
        &self,
        caller: &Caller,
        req: OrderActionRequest,
    ) -> AppResult<ActionResponse<OrderProjection>> {
        let scope = self.enter(caller, ActionId::ResumeOrder, req.entity_type).await?;
        let order = self.load_order(&scope, req.target_entity_id).await?;
        self.apply_move(
            scope,
            order,
            Move {
                to: OrderStatus::Open,
                shift_id: None,
                reason: None,
                audit: AuditAction::OrderResumed,
            },
        )
        .await
    }

    /// open | held → voided
    pub async fn void_order(
        &self,
        caller: &Caller,
        req: ReasonRequest,
    ) -> AppResult<ActionResponse<OrderProjection>> {
        let scope = self.enter(caller, ActionId::VoidOrder, req.entity_type).await?;
        let reason = required_text(&req.reason, "reason")?;
        let order = self.load_order(&scope, req.target_entity_id).await?;
        self.apply_move(
            scope,
            order,
            Move {
                to: OrderStatus::Voided,
                shift_id: None,
                reason: Some(reason),
                audit: AuditAction::OrderVoided,
            },
        )
        .await
    }

    /// Void one item of an open or held order and recompute its total
    pub async fn void_item(
        &self,
        caller: &Caller,
        req: VoidItemRequest,
    ) -> AppResult<ActionResponse<OrderProjection>> {
        let scope = self.enter(caller, ActionId::VoidItem, req.entity_type).await?;
        let reason = optional_text(req.reason.as_deref(), "reason")?;
        let order = self.load_order(&scope, req.target_entity_id).await?;

        let item = order.item(req.item_id).cloned().ok_or_else(|| {
            AppError::not_found("Order item").with_detail("itemId", req.item_id)
        })?;

        let warnings = scope.check(&scope.order_context(&order))?;
        if item.voided {
            return Err(AppError::conflict("Item is already voided").with_detail("itemId", item.id));
        }

        let write = ItemVoid {
            order_id: order.id,
            item_id: item.id,
            expected_status: order.status,
            at: shared::util::now_millis(),
        };
        let entry = scope
            .audit_entry(AuditAction::OrderItemVoided, EntityKind::Order, order.id)
            .statuses(Some(order.status.as_str()), Some(order.status.as_str()))
            .details(json!({
                "itemId": item.id,
                "name": item.name,
                "quantity": item.quantity,
                "reason": reason,
            }));

        let mut committed = order;
        for line in committed.items.iter_mut().filter(|line| line.id == item.id) {
            line.voided = true;
        }
        committed.total = committed
            .items
            .iter()
            .filter(|line| !line.voided)
            .map(|line| line.line_total())
            .sum();
        committed.updated_at = write.at;

        let this = self.clone();
        let updated = self
            .commit(async move {
                if !this.orders.void_item(&write).await? {
                    return Err(conflict(EntityKind::Order, write.order_id));
                }
                Ok(this.finish_order(&scope, entry, committed).await)
            })
            .await?;

        Ok(ActionResponse::ok(updated.projection()).with_warnings(warnings))
    }

    async fn apply_move(
        &self,
        scope: Scope,
        order: Order,
        step: Move,
    ) -> AppResult<ActionResponse<OrderProjection>> {
        let warnings = scope.check(&scope.order_context(&order))?;

        // Invariants passed, so the lifecycle allows this; guard anyway
        let to = lifecycle::next_status(scope.action(), order.status)
            .filter(|to| *to == step.to)
            .ok_or_else(|| conflict(EntityKind::Order, order.id))?;

        let write = StatusTransition {
            order_id: order.id,
            from: order.status,
            to,
            shift_id: step.shift_id,
            reason: step.reason.clone(),
            at: shared::util::now_millis(),
        };
        let entry = scope
            .audit_entry(step.audit, EntityKind::Order, order.id)
            .statuses(Some(order.status.as_str()), Some(to.as_str()))
            .details(json!({
                "reason": step.reason,
                "shiftId": step.shift_id,
                "tableId": order.table_id,
            }));

        let committed = Order {
            status: to,
            shift_id: write.shift_id.or(order.shift_id),
            reason: write.reason.clone().or_else(|| order.reason.clone()),
            updated_at: write.at,
            ..order
        };

        let this = self.clone();
        let updated = self
            .commit(async move {
                if !this.orders.transition(&write).await? {
                    return Err(conflict(EntityKind::Order, write.order_id));
                }
                Ok(this.finish_order(&scope, entry, committed).await)
            })
            .await?;

        Ok(ActionResponse::ok(updated.projection()).with_warnings(warnings))
    }

    /// After a committed order write: audit, notify downstream
    ///
    /// `committed` is the loaded order with this request's write applied; the
    /// row is never read back after commit.
    pub(super) async fn finish_order(&self, scope: &Scope, entry: AuditEntry, committed: Order) -> Order {
        self.audit.record(entry).await;
        self.bus
            .publish_effects(scope.descriptor, &scope.restaurant, committed.branch_id, committed.id);
        committed
    }
}
