//! Caller extractor
//!
//! Fails closed: missing header, malformed header, bad signature and expiry
//! all reject with `unauthenticated`.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::error::AppError;

use super::{Caller, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

impl FromRequestParts<ServerState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(caller) = parts.extensions.get::<Caller>() {
            return Ok(caller.clone());
        }

        let uri = parts.uri.path().to_string();
        let header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let Some(header) = header else {
            security_log!(WARN, "auth_missing", uri = %uri);
            return Err(AppError::unauthenticated("Missing bearer credential"));
        };

        let Some(token) = JwtService::extract_from_header(header) else {
            security_log!(WARN, "auth_malformed", uri = %uri);
            return Err(AppError::unauthenticated("Malformed authorization header"));
        };

        match state.jwt.validate_token(token) {
            Ok(claims) => {
                let caller = Caller::from(claims);
                parts.extensions.insert(caller.clone());
                Ok(caller)
            }
            Err(e) => {
                security_log!(WARN, "auth_failed", error = %e, uri = %uri);
                let message = match e {
                    JwtError::ExpiredToken => "Credential expired",
                    _ => "Invalid credential",
                };
                Err(AppError::unauthenticated(message))
            }
        }
    }
}
