//! Auth handlers: register, login, refresh, logout variants, password change.

use axum::Json;
use axum::extract::State;

use skybook_auth::Registration;

use crate::dto::request::{
    ChangePasswordRequest, LoginRequest, LogoutDeviceRequest, LogoutRequest, RefreshRequest,
    RegisterRequest,
};
use crate::dto::response::{AuthResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ClientContext, ValidatedJson};
use crate::state::AppState;

/// POST /api/auth/register (alias /api/auth/signup)
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .auth
        .register(Registration {
            username: req.username,
            email: req.email,
            password: req.password,
            roles: req.roles,
        })
        .await?;

    Ok(Json(MessageResponse::new("User registered successfully")))
}

/// POST /api/auth/login (alias /api/auth/signin)
pub async fn login(
    State(state): State<AppState>,
    client: ClientContext,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let result = state
        .auth
        .login(
            &req.username,
            &req.password,
            client.device_id.as_deref(),
            &client.meta,
        )
        .await?;

    Ok(Json(result.into()))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    client: ClientContext,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let device_id = req
        .device_id
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .or(client.device_id.as_deref());

    let result = state
        .auth
        .refresh(&req.refresh_token, device_id, &client.meta)
        .await?;

    Ok(Json(result.into()))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LogoutRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth.logout(&req.refresh_token).await?;
    Ok(Json(MessageResponse::new("Logged out")))
}

/// POST /api/auth/logout-all
pub async fn logout_all(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth.logout_all(auth.user_id()).await?;
    Ok(Json(MessageResponse::new("Logged out from all devices")))
}

/// POST /api/auth/logout-device
pub async fn logout_device(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<LogoutDeviceRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .auth
        .logout_device(auth.user_id(), req.device_id.trim())
        .await?;
    Ok(Json(MessageResponse::new("Logged out from device")))
}

/// POST /api/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .auth
        .change_password(auth.user_id(), &req.current_password, &req.new_password)
        .await?;
    Ok(Json(MessageResponse::new(
        "Password changed; all sessions have been signed out",
    )))
}
