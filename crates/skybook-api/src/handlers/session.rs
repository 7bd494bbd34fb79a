//! Session listing and revocation for the authenticated user.

use axum::Json;
use axum::extract::State;

use crate::dto::request::RevokeSessionRequest;
use crate::dto::response::{MessageResponse, SessionResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// GET /api/auth/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<SessionResponse>>, ApiError> {
    let sessions = state.auth.list_active_sessions(auth.user_id()).await?;
    Ok(Json(sessions.into_iter().map(SessionResponse::from).collect()))
}

/// POST /api/auth/revoke-session
pub async fn revoke_session(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<RevokeSessionRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .auth
        .revoke_session(auth.user_id(), req.session_id)
        .await?;
    Ok(Json(MessageResponse::new("Session revoked")))
}
