//! Token bucket rate limiting for the credential endpoints.
//!
//! Buckets are keyed by endpoint group and peer IP. Denials short-circuit
//! with 429 and a `Retry-After` header before the handler runs.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use skybook_auth::{Admission, EndpointGroup};
use skybook_core::error::AppError;

use crate::error::ApiError;
use crate::extractors::peer_ip;
use crate::state::AppState;

/// Client key used when the peer address is unavailable.
const UNKNOWN_CLIENT: &str = "unknown";

/// Limits `login` and `signin`.
pub async fn login_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    enforce(&state, EndpointGroup::Login, request, next).await
}

/// Limits `refresh`.
pub async fn refresh_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    enforce(&state, EndpointGroup::Refresh, request, next).await
}

async fn enforce(
    state: &AppState,
    group: EndpointGroup,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.config.rate_limit.enabled {
        return Ok(next.run(request).await);
    }

    let client_key = peer_ip(request.extensions())
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string());

    match state.rate_limiter.try_consume(group, &client_key).await? {
        Admission::Admitted { .. } => Ok(next.run(request).await),
        Admission::Denied {
            retry_after_seconds,
        } => Err(AppError::rate_limited(retry_after_seconds).into()),
    }
}
