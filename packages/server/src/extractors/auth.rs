use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Shortest string that could conceivably be a signed JWT. Anything shorter
/// is rejected before we bother with signature verification.
const MIN_TOKEN_LEN: usize = 16;

/// Authenticated user extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require authentication. Workspace
/// lookup happens via `utils::tenant::resolve_tenant()` in the handler body.
pub struct AuthUser {
    pub user_id: Uuid,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthenticated)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::Unauthenticated)?;

        if token.len() < MIN_TOKEN_LEN {
            return Err(AppError::InvalidCredential);
        }

        let claims = jwt::verify(token, &state.config.auth.jwt_secret)
            .map_err(|_| AppError::InvalidCredential)?;

        let user_id = claims
            .sub
            .parse()
            .map_err(|_| AppError::InvalidCredential)?;

        Ok(AuthUser { user_id })
    }
}
