//! Payment completion and refunds

use rust_decimal::Decimal;
use serde_json::json;
use shared::error::{AppError, AppResult};
use shared::models::{Order, OrderProjection, OrderStatus, Shift};
use shared::request::{CompletePaymentRequest, EntityKind, RefundRequest};
use shared::response::ActionResponse;

use super::{Gateway, Scope, amount_error, conflict, required_text};
use crate::actions::ActionId;
use crate::audit::AuditAction;
use crate::auth::Caller;
use crate::db::{RefundWrite, Settlement};
use crate::payment::{self, SplitError};
use crate::utils::money;

impl Gateway {
    /// open → paid, appending one payment record per tender
    ///
    /// The split is computed before invariant evaluation; its outcome feeds
    /// the payment invariants. Malformed tenders are reported only after
    /// the invariants pass, so a held order is always reported as held.
    pub async fn complete_payment(
        &self,
        caller: &Caller,
        req: CompletePaymentRequest,
    ) -> AppResult<ActionResponse<OrderProjection>> {
        let scope = self
            .enter(caller, ActionId::CompletePayment, req.entity_type)
            .await?;
        let order = self.load_order(&scope, req.target_entity_id).await?;
        let settling = self.settling_shift(&scope, &order).await?;

        let split = payment::calculate(order.total, &req.payments);

        let mut ctx = scope.order_context(&order);
        ctx.shift_open = Some(settling.is_some());
        match &split {
            Ok(split) => {
                ctx.payment_remaining = Some(split.remaining);
                ctx.non_cash_overpayment = Some(false);
            }
            Err(SplitError::NonCashOverpayment { .. }) => {
                ctx.payment_remaining = Some(Decimal::ZERO);
                ctx.non_cash_overpayment = Some(true);
            }
            Err(_) => {}
        }
        let warnings = scope.check(&ctx)?;

        let split = split.map_err(|e| AppError::validation(e.to_string()).with_detail("field", "payments"))?;
        let shift = settling.ok_or_else(|| AppError::internal("Settling shift missing after checks"))?;

        let write = Settlement {
            order_id: order.id,
            shift_id: shift.id,
            expected_total: order.total,
            change: split.overpayment,
            tenders: split.tenders.clone(),
            actor_id: caller.user_id.clone(),
            at: shared::util::now_millis(),
        };
        let entry = scope
            .audit_entry(AuditAction::OrderPaid, EntityKind::Order, order.id)
            .statuses(Some(order.status.as_str()), Some(OrderStatus::Paid.as_str()))
            .details(json!({
                "shiftId": shift.id,
                "split": split,
            }));

        let committed = Order {
            status: OrderStatus::Paid,
            shift_id: Some(write.shift_id),
            change_given: write.change,
            updated_at: write.at,
            ..order
        };

        let this = self.clone();
        let updated = self
            .commit(async move {
                if !this.orders.settle(&write).await? {
                    return Err(conflict(EntityKind::Order, write.order_id));
                }
                Ok(this.finish_order(&scope, entry, committed).await)
            })
            .await?;

        Ok(ActionResponse::ok(updated.projection()).with_warnings(warnings))
    }

    /// Append a refund; the order keeps its status
    pub async fn refund_order(
        &self,
        caller: &Caller,
        req: RefundRequest,
    ) -> AppResult<ActionResponse<OrderProjection>> {
        let scope = self.enter(caller, ActionId::RefundOrder, req.entity_type).await?;
        let reason = required_text(&req.reason, "reason")?;
        let amount = money::validate_positive(req.amount, "amount").map_err(amount_error("amount"))?;
        let order = self.load_order(&scope, req.target_entity_id).await?;

        let mut ctx = scope.order_context(&order);
        ctx.refund_amount = Some(amount);
        ctx.refundable = Some(order.refundable());
        let warnings = scope.check(&ctx)?;

        let write = RefundWrite {
            order_id: order.id,
            expected_status: order.status,
            expected_refunded: order.refunded,
            amount,
            reason: reason.clone(),
            actor_id: caller.user_id.clone(),
            at: shared::util::now_millis(),
        };
        let entry = scope
            .audit_entry(AuditAction::OrderRefunded, EntityKind::Order, order.id)
            .statuses(Some(order.status.as_str()), Some(order.status.as_str()))
            .details(json!({
                "amount": amount.to_string(),
                "refundedBefore": order.refunded.to_string(),
                "reason": reason,
            }));

        let committed = Order {
            refunded: order.refunded + write.amount,
            updated_at: write.at,
            ..order
        };

        let this = self.clone();
        let updated = self
            .commit(async move {
                if !this.orders.refund(&write).await? {
                    return Err(conflict(EntityKind::Order, write.order_id));
                }
                Ok(this.finish_order(&scope, entry, committed).await)
            })
            .await?;

        Ok(ActionResponse::ok(updated.projection()).with_warnings(warnings))
    }

    /// The order's own shift while it is open, else the caller's open shift
    /// in the order's branch
    async fn settling_shift(&self, scope: &Scope, order: &Order) -> AppResult<Option<Shift>> {
        if let Some(shift_id) = order.shift_id
            && let Some(shift) = self.shifts.find_shift(shift_id).await?
            && shift.is_open()
        {
            return Ok(Some(shift));
        }
        Ok(self
            .shifts
            .find_open_shift_for(&scope.caller.user_id)
            .await?
            .filter(|shift| shift.branch_id == order.branch_id))
    }
}
