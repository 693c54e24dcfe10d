//! Tenant Repository (restaurants, branches, staff role assignments)

use super::RepoResult;
use shared::models::{Branch, Restaurant, StaffRole, StaffRoleAssignment};
use sqlx::SqlitePool;

const RESTAURANT_COLUMNS: &str = "id, name, is_active, subscription_starts_at, subscription_expires_at, qr_ordering_enabled, kitchen_display_enabled, inventory_enabled";

pub async fn find_restaurant(pool: &SqlitePool, id: i64) -> RepoResult<Option<Restaurant>> {
    let restaurant = sqlx::query_as::<_, Restaurant>(&format!(
        "SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(restaurant)
}

pub async fn find_branch(pool: &SqlitePool, id: i64) -> RepoResult<Option<Branch>> {
    let branch = sqlx::query_as::<_, Branch>(
        "SELECT id, restaurant_id, name FROM branches WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(branch)
}

/// The caller's only active assignment; inactive ones behave as no role
pub async fn find_active_assignment(
    pool: &SqlitePool,
    user_id: &str,
) -> RepoResult<Option<StaffRoleAssignment>> {
    let assignment = sqlx::query_as::<_, StaffRoleAssignment>(
        "SELECT id, user_id, role, restaurant_id, branch_id, is_active FROM staff_role_assignments WHERE user_id = ? AND is_active = 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(assignment)
}

pub async fn create_restaurant(pool: &SqlitePool, data: &Restaurant) -> RepoResult<()> {
    sqlx::query(&format!(
        "INSERT INTO restaurants ({RESTAURANT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(data.id)
    .bind(&data.name)
    .bind(data.is_active)
    .bind(data.subscription_starts_at)
    .bind(data.subscription_expires_at)
    .bind(data.qr_ordering_enabled)
    .bind(data.kitchen_display_enabled)
    .bind(data.inventory_enabled)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn create_branch(pool: &SqlitePool, data: &Branch) -> RepoResult<()> {
    sqlx::query("INSERT INTO branches (id, restaurant_id, name) VALUES (?, ?, ?)")
        .bind(data.id)
        .bind(data.restaurant_id)
        .bind(&data.name)
        .execute(pool)
        .await?;
    Ok(())
}

/// Assign `role`; fails with `Duplicate` if the user already has an active one
pub async fn assign_role(
    pool: &SqlitePool,
    user_id: &str,
    role: StaffRole,
    restaurant_id: i64,
    branch_id: i64,
) -> RepoResult<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO staff_role_assignments (user_id, role, restaurant_id, branch_id, is_active) VALUES (?, ?, ?, ?, 1) RETURNING id",
    )
    .bind(user_id)
    .bind(role)
    .bind(restaurant_id)
    .bind(branch_id)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn deactivate_assignment(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE staff_role_assignments SET is_active = 0 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn set_restaurant_active(pool: &SqlitePool, id: i64, active: bool) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE restaurants SET is_active = ? WHERE id = ?")
        .bind(active)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
