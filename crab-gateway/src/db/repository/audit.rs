//! Audit Repository (append-only)

use super::RepoResult;
use crate::audit::{AuditEntry, AuditRecord};
use sqlx::SqlitePool;

pub async fn append(pool: &SqlitePool, entry: &AuditEntry) -> RepoResult<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO audit_logs (actor_id, action, entity_type, entity_id, restaurant_id, branch_id, before_status, after_status, details, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&entry.actor_id)
    .bind(entry.action.as_str())
    .bind(entry.entity_type.as_str())
    .bind(entry.entity_id)
    .bind(entry.restaurant_id)
    .bind(entry.branch_id)
    .bind(&entry.before_status)
    .bind(&entry.after_status)
    .bind(entry.details.to_string())
    .bind(entry.created_at)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn find_by_entity(
    pool: &SqlitePool,
    entity_type: &str,
    entity_id: i64,
) -> RepoResult<Vec<AuditRecord>> {
    let records = sqlx::query_as::<_, AuditRecord>(
        "SELECT id, actor_id, action, entity_type, entity_id, restaurant_id, branch_id, before_status, after_status, details, created_at FROM audit_logs WHERE entity_type = ? AND entity_id = ? ORDER BY id",
    )
    .bind(entity_type)
    .bind(entity_id)
    .fetch_all(pool)
    .await?;
    Ok(records)
}
