//! `AuthUser` extractor: pulls the JWT from the Authorization header,
//! validates it and resolves the current user.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use uuid::Uuid;

use skybook_auth::Claims;
use skybook_core::error::AppError;
use skybook_entity::user::User;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated principal available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Decoded access-token claims.
    pub claims: Claims,
    /// The user as currently stored.
    pub user: User,
}

impl AuthUser {
    /// Id of the authenticated user.
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthenticated("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::unauthenticated("Invalid Authorization header format"))?;

        let (claims, user) = state.auth.authenticate(token).await?;
        Ok(AuthUser { claims, user })
    }
}
