//! 认证模块
//!
//! - [`JwtService`] 令牌签发与校验
//! - [`Caller`] 已认证调用者 (axum 提取器)

mod extractor;
pub mod jwt;

pub use jwt::{Claims, JwtConfig, JwtError, JwtService};

/// Authenticated caller, built from validated claims
///
/// Carries identity only. Role, restaurant and branch come from the caller's
/// active staff role assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub name: String,
}

impl Caller {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
        }
    }
}

impl From<Claims> for Caller {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            name: claims.name,
        }
    }
}
