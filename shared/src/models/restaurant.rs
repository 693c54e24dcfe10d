//! Tenant models: Restaurant and Branch

use serde::{Deserialize, Serialize};

/// Tenant root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
    /// Subscription window, Unix millis
    pub subscription_starts_at: i64,
    /// `None` means no expiry
    pub subscription_expires_at: Option<i64>,
    /// QR self-ordering module
    pub qr_ordering_enabled: bool,
    /// Kitchen display module
    pub kitchen_display_enabled: bool,
    /// Inventory tracking module
    pub inventory_enabled: bool,
}

impl Restaurant {
    /// Whether `now` falls inside the subscription window
    pub fn subscription_valid_at(&self, now: i64) -> bool {
        now >= self.subscription_starts_at
            && self.subscription_expires_at.is_none_or(|expires| now < expires)
    }
}

/// Operational unit under a restaurant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Branch {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
}
