//! Shift handlers (班次管理)

use rust_decimal::Decimal;
use serde_json::json;
use shared::error::{AppError, AppResult};
use shared::models::{Shift, ShiftStatus, StaffRole};
use shared::request::{CloseShiftRequest, EntityKind, OpenShiftRequest};
use shared::response::ActionResponse;

use super::{Gateway, amount_error, conflict, optional_text};
use crate::actions::ActionId;
use crate::audit::AuditAction;
use crate::auth::Caller;
use crate::db::{NewShift, ShiftClosing};
use crate::security_log;
use crate::utils::money;

impl Gateway {
    /// Open a drawer session for the caller in the target branch
    pub async fn open_shift(
        &self,
        caller: &Caller,
        req: OpenShiftRequest,
    ) -> AppResult<ActionResponse<Shift>> {
        let scope = self.enter(caller, ActionId::OpenShift, req.entity_type).await?;
        let opening_cash = money::validate_non_negative(req.opening_cash, "openingCash")
            .map_err(amount_error("openingCash"))?;
        let note = optional_text(req.note.as_deref(), "note")?;

        let branch = self
            .tenants
            .find_branch(req.target_entity_id)
            .await?
            .ok_or_else(|| AppError::not_found("Branch").with_detail("branchId", req.target_entity_id))?;
        scope.ensure_owns(EntityKind::Branch, branch.id, branch.restaurant_id, branch.id)?;

        let current = self.shifts.find_open_shift_for(&caller.user_id).await?;
        let mut ctx = scope.context();
        ctx.cashier_has_open_shift = Some(current.is_some());
        let warnings = scope.check(&ctx)?;

        let write = NewShift {
            restaurant_id: branch.restaurant_id,
            branch_id: branch.id,
            cashier_id: caller.user_id.clone(),
            opening_cash,
            note,
            at: shared::util::now_millis(),
        };

        let this = self.clone();
        let shift = self
            .commit(async move {
                // Unique open-shift index lost to a concurrent open
                let Some(shift_id) = this.shifts.open_shift(&write).await? else {
                    return Err(conflict(EntityKind::Branch, write.branch_id));
                };
                let entry = scope
                    .audit_entry(AuditAction::ShiftOpened, EntityKind::Shift, shift_id)
                    .statuses(None, Some(ShiftStatus::Open.as_str()))
                    .details(json!({ "openingCash": write.opening_cash.to_string() }));
                this.audit.record(entry).await;
                Ok(opened_shift(shift_id, write))
            })
            .await?;

        Ok(ActionResponse::ok(shift).with_warnings(warnings))
    }

    /// Close an open shift and reconcile its drawer
    ///
    /// Cashiers may only close their own shift; owners may close any shift
    /// in their branch.
    pub async fn close_shift(
        &self,
        caller: &Caller,
        req: CloseShiftRequest,
    ) -> AppResult<ActionResponse<Shift>> {
        let scope = self.enter(caller, ActionId::CloseShift, req.entity_type).await?;
        let counted = money::validate_non_negative(req.closing_cash, "closingCash")
            .map_err(amount_error("closingCash"))?;
        let note = optional_text(req.note.as_deref(), "note")?;

        let shift = self
            .shifts
            .find_shift(req.target_entity_id)
            .await?
            .ok_or_else(|| AppError::not_found("Shift").with_detail("shiftId", req.target_entity_id))?;
        scope.ensure_owns(EntityKind::Shift, shift.id, shift.restaurant_id, shift.branch_id)?;

        if scope.role == StaffRole::Cashier && shift.cashier_id != caller.user_id {
            security_log!(
                WARN,
                "foreign_shift_close",
                user_id = %caller.user_id,
                shift_id = shift.id
            );
            return Err(AppError::forbidden("Cashiers can only close their own shift"));
        }

        let mut ctx = scope.context();
        ctx.shift_status = Some(shift.status);
        if shift.is_open() {
            let expected = self.shifts.expected_cash(shift.id).await?;
            ctx.unsettled_orders_in_shift = Some(self.shifts.count_unsettled_orders(shift.id).await?);
            ctx.cash_difference = Some(counted - expected);
        }
        let warnings = scope.check(&ctx)?;

        let write = ShiftClosing {
            shift_id: shift.id,
            closing_cash: counted,
            closed_by: caller.user_id.clone(),
            note,
            at: shared::util::now_millis(),
        };

        let this = self.clone();
        let shift_id = shift.id;
        let closed = self
            .commit(async move {
                let Some(expected) = this.shifts.close_shift(&write).await? else {
                    return Err(conflict(EntityKind::Shift, shift_id));
                };
                let closed = closed_shift(shift, &write, expected);

                let entry = scope
                    .audit_entry(AuditAction::ShiftClosed, EntityKind::Shift, shift_id)
                    .statuses(Some(ShiftStatus::Open.as_str()), Some(ShiftStatus::Closed.as_str()))
                    .details(json!({
                        "closingCash": write.closing_cash.to_string(),
                        "expectedCash": closed.expected_cash.map(|d| d.to_string()),
                        "cashDifference": closed.cash_difference.map(|d| d.to_string()),
                    }));
                this.audit.record(entry).await;
                Ok(closed)
            })
            .await?;

        Ok(ActionResponse::ok(closed).with_warnings(warnings))
    }
}

/// Committed projection of a freshly inserted shift
fn opened_shift(id: i64, write: NewShift) -> Shift {
    Shift {
        id,
        restaurant_id: write.restaurant_id,
        branch_id: write.branch_id,
        cashier_id: write.cashier_id,
        status: ShiftStatus::Open,
        opening_cash: write.opening_cash,
        closing_cash: None,
        expected_cash: None,
        cash_difference: None,
        opened_at: write.at,
        closed_at: None,
        closed_by: None,
        note: write.note,
    }
}

/// Committed projection of a closed shift
fn closed_shift(shift: Shift, write: &ShiftClosing, expected: Decimal) -> Shift {
    Shift {
        status: ShiftStatus::Closed,
        closing_cash: Some(write.closing_cash),
        expected_cash: Some(expected),
        cash_difference: Some(write.closing_cash - expected),
        closed_at: Some(write.at),
        closed_by: Some(write.closed_by.clone()),
        note: write.note.clone().or(shift.note),
        ..shift
    }
}
