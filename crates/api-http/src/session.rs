//! Admin Session Extraction
//!
//! Builds a `SessionContext` per request from the bearer token and rejects
//! anything but an admin identity.

use crate::error::ApiError;
use crate::server::AppState;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use cgsg_core::application::SessionContext;
use cgsg_core::domain::Identity;
use cgsg_core::error::AppError;

/// Signed-in admin for the current request
#[derive(Debug, Clone)]
pub struct AdminSession(pub Identity);

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;

        let mut session = SessionContext::new(state.identity.clone());
        session.sign_in(token).await?;
        let identity = session.require_admin()?.clone();

        Ok(AdminSession(identity))
    }
}

/// Token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
