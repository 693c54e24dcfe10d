//! Staff role assignments
//!
//! Authorization always resolves through [`StaffRoleAssignment`]; an inactive
//! assignment is treated as no role at all.

use super::UnknownVariant;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum StaffRole {
    Cashier,
    Owner,
    Kitchen,
    SystemAdmin,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cashier => "cashier",
            Self::Owner => "owner",
            Self::Kitchen => "kitchen",
            Self::SystemAdmin => "system_admin",
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StaffRole {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cashier" => Ok(Self::Cashier),
            "owner" => Ok(Self::Owner),
            "kitchen" => Ok(Self::Kitchen),
            "system_admin" => Ok(Self::SystemAdmin),
            other => Err(UnknownVariant {
                kind: "staff role",
                value: other.to_string(),
            }),
        }
    }
}

/// Binds a user to a role inside one branch of one restaurant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StaffRoleAssignment {
    pub id: i64,
    pub user_id: String,
    pub role: StaffRole,
    pub restaurant_id: i64,
    pub branch_id: i64,
    pub is_active: bool,
}
