//! Transition Gateway
//!
//! One handler per action, each running the same pipeline:
//!
//! ```text
//! authenticate (Caller extractor)
//!   → authorize      active StaffRoleAssignment, role ∈ allowedRoles
//!   → tenant health  restaurant active, subscription valid        (403)
//!   → load target    order / shift / branch                       (404)
//!   → isolation      entity restaurant+branch == caller scope     (403)
//!   → invariants     descriptor.related_invariants, first blocking (409)
//!   → commit         conditional write, 0 rows ⇒ conflict         (409)
//!   → audit          best-effort, never fails the response
//!   → respond        minimal projection + warnings
//! ```
//!
//! Commit and audit run on a spawned task: once the conditional write has
//! been issued, a disconnecting caller cannot cancel it or its audit entry.

mod orders;
mod payment;
mod shifts;

#[cfg(test)]
pub(crate) mod tests;

use std::future::Future;
use std::sync::Arc;

use shared::error::{AppError, AppResult};
use shared::models::{Order, Restaurant, StaffRole};
use shared::request::EntityKind;
use shared::response::WarningNotice;
use sqlx::SqlitePool;

use crate::actions::{self, ActionDescriptor, ActionId};
use crate::audit::{AuditAction, AuditEntry, AuditService};
use crate::auth::Caller;
use crate::db::{AuditSink, OrderStore, RepoError, ShiftStore, SqliteStore, TenantStore};
use crate::invariants::{self, InvariantCategory, InvariantContext};
use crate::notify::DownstreamBus;
use crate::security_log;

/// Longest accepted reason or note
const MAX_TEXT_LEN: usize = 500;

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Validation(msg) => AppError::validation(msg),
            other => {
                tracing::error!(error = %other, "Storage failure");
                AppError::internal("Storage failure")
            }
        }
    }
}

#[derive(Clone)]
pub struct Gateway {
    tenants: Arc<dyn TenantStore>,
    orders: Arc<dyn OrderStore>,
    shifts: Arc<dyn ShiftStore>,
    audit: AuditService,
    bus: DownstreamBus,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway").finish_non_exhaustive()
    }
}

/// Resolved caller scope for one request
#[derive(Debug, Clone)]
pub(crate) struct Scope {
    pub caller: Caller,
    pub role: StaffRole,
    pub restaurant: Restaurant,
    pub branch_id: i64,
    pub descriptor: &'static ActionDescriptor,
    /// Evaluation time, Unix millis
    pub now: i64,
}

impl Scope {
    pub fn action(&self) -> ActionId {
        self.descriptor.id
    }

    /// Tenant and module facts plus the attempted action
    pub fn context(&self) -> InvariantContext {
        InvariantContext {
            action: Some(self.action()),
            restaurant_active: Some(self.restaurant.is_active),
            subscription_valid: Some(self.restaurant.subscription_valid_at(self.now)),
            qr_ordering_enabled: Some(self.restaurant.qr_ordering_enabled),
            kitchen_display_enabled: Some(self.restaurant.kitchen_display_enabled),
            inventory_enabled: Some(self.restaurant.inventory_enabled),
            ..Default::default()
        }
    }

    pub fn order_context(&self, order: &Order) -> InvariantContext {
        InvariantContext {
            order_status: Some(order.status),
            order_empty: Some(order.is_empty()),
            ..self.context()
        }
    }

    /// Entity ownership, checked after every load regardless of role
    pub fn ensure_owns(
        &self,
        kind: EntityKind,
        id: i64,
        restaurant_id: i64,
        branch_id: i64,
    ) -> AppResult<()> {
        if restaurant_id == self.restaurant.id && branch_id == self.branch_id {
            return Ok(());
        }
        security_log!(
            WARN,
            "cross_tenant_access",
            user_id = %self.caller.user_id,
            action = %self.action(),
            entity_type = kind.as_str(),
            entity_id = id,
            caller_branch = self.branch_id,
            entity_branch = branch_id
        );
        Err(AppError::forbidden(format!(
            "{} {id} is outside your restaurant or branch",
            kind.as_str()
        )))
    }

    /// Evaluate the action's invariants; first blocking failure rejects
    pub fn check(&self, ctx: &InvariantContext) -> AppResult<Vec<WarningNotice>> {
        let evaluation = invariants::evaluate_all(self.descriptor.related_invariants, ctx);
        if let Some(inv) = evaluation.first_blocking() {
            tracing::info!(
                action = %self.action(),
                invariant = inv.id,
                user_id = %self.caller.user_id,
                "Transition blocked"
            );
            return Err(AppError::invariant_blocked(inv.id, inv.rule)
                .with_detail("remediation", inv.remediation)
                .with_detail("action", self.action().as_str()));
        }
        Ok(evaluation.warning_notices())
    }

    pub fn audit_entry(&self, action: AuditAction, kind: EntityKind, id: i64) -> AuditEntry {
        AuditEntry::new(self.caller.user_id.clone(), action, kind, id)
            .scope(self.restaurant.id, self.branch_id)
    }
}

impl Gateway {
    pub fn new(
        tenants: Arc<dyn TenantStore>,
        orders: Arc<dyn OrderStore>,
        shifts: Arc<dyn ShiftStore>,
        audit_sink: Arc<dyn AuditSink>,
        bus: DownstreamBus,
    ) -> Self {
        Self {
            tenants,
            orders,
            shifts,
            audit: AuditService::new(audit_sink),
            bus,
        }
    }

    /// Gateway over a single SQLite pool
    pub fn sqlite(pool: SqlitePool, bus: DownstreamBus) -> Self {
        let store = Arc::new(SqliteStore::new(pool));
        Self::new(store.clone(), store.clone(), store.clone(), store, bus)
    }

    pub fn bus(&self) -> &DownstreamBus {
        &self.bus
    }

    /// Authorize the caller and check tenant health
    pub(crate) async fn enter(
        &self,
        caller: &Caller,
        action: ActionId,
        declared: Option<EntityKind>,
    ) -> AppResult<Scope> {
        let descriptor = actions::resolve(action);

        if let Some(kind) = declared.filter(|kind| *kind != descriptor.target) {
            return Err(AppError::validation(format!(
                "{action} targets a {}, not a {}",
                descriptor.target.as_str(),
                kind.as_str()
            ))
            .with_detail("entityType", kind.as_str()));
        }

        // Authorize
        let Some(assignment) = self.tenants.find_active_assignment(&caller.user_id).await? else {
            security_log!(WARN, "no_active_role", user_id = %caller.user_id, action = %action);
            return Err(AppError::forbidden("No active role assignment"));
        };

        if !descriptor.allows_role(assignment.role) {
            security_log!(
                WARN,
                "role_denied",
                user_id = %caller.user_id,
                role = %assignment.role,
                action = %action
            );
            return Err(AppError::forbidden(format!(
                "Role {} may not perform {action}",
                assignment.role
            ))
            .with_detail("role", assignment.role.as_str()));
        }

        let restaurant = self.tenants.find_restaurant(assignment.restaurant_id).await?;
        let branch = self.tenants.find_branch(assignment.branch_id).await?;
        let (Some(restaurant), Some(branch)) = (restaurant, branch) else {
            security_log!(WARN, "scope_missing", user_id = %caller.user_id, action = %action);
            return Err(AppError::forbidden("Restaurant or branch scope missing"));
        };
        if branch.restaurant_id != restaurant.id {
            security_log!(WARN, "scope_mismatch", user_id = %caller.user_id, branch_id = branch.id);
            return Err(AppError::forbidden("Restaurant or branch scope missing"));
        }

        let scope = Scope {
            caller: caller.clone(),
            role: assignment.role,
            restaurant,
            branch_id: branch.id,
            descriptor,
            now: shared::util::now_millis(),
        };

        // Tenant health, before any other invariant
        let tenant_rules: Vec<&str> = descriptor
            .related_invariants
            .iter()
            .copied()
            .filter(|id| {
                invariants::get(id).is_some_and(|inv| inv.category == InvariantCategory::Tenant)
            })
            .collect();
        let evaluation = invariants::evaluate_all(&tenant_rules, &scope.context());
        if let Some(inv) = evaluation.first_blocking() {
            security_log!(
                WARN,
                "tenant_inactive",
                user_id = %caller.user_id,
                restaurant_id = scope.restaurant.id,
                invariant = inv.id
            );
            return Err(AppError::forbidden(inv.rule).with_detail("invariantId", inv.id));
        }

        Ok(scope)
    }

    /// Load an order and assert it belongs to the caller's scope
    pub(crate) async fn load_order(&self, scope: &Scope, order_id: i64) -> AppResult<Order> {
        let order = self
            .orders
            .find_order(order_id)
            .await?
            .ok_or_else(|| AppError::not_found("Order").with_detail("orderId", order_id))?;
        scope.ensure_owns(EntityKind::Order, order.id, order.restaurant_id, order.branch_id)?;
        Ok(order)
    }

    /// Run a commit on a detached task
    pub(crate) async fn commit<T, F>(&self, work: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        match tokio::spawn(work).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "Commit task failed");
                Err(AppError::internal("Commit task failed"))
            }
        }
    }
}

/// Lost the conditional write
pub(crate) fn conflict(kind: EntityKind, id: i64) -> AppError {
    AppError::conflict(format!(
        "The {} was changed by another request; reload it and decide again",
        kind.as_str()
    ))
    .with_detail("entityType", kind.as_str())
    .with_detail("entityId", id)
}

/// Trimmed, non-empty, bounded text field
pub(crate) fn required_text(value: &str, field: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} is required")).with_detail("field", field));
    }
    optional_text(Some(trimmed), field).map(|t| t.unwrap_or_default())
}

pub(crate) fn optional_text(value: Option<&str>, field: &str) -> AppResult<Option<String>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) if v.chars().count() > MAX_TEXT_LEN => Err(AppError::validation(format!(
            "{field} exceeds {MAX_TEXT_LEN} characters"
        ))
        .with_detail("field", field)),
        other => Ok(other.map(str::to_string)),
    }
}

pub(crate) fn amount_error(field: &'static str) -> impl Fn(String) -> AppError {
    move |message| AppError::validation(message).with_detail("field", field)
}
