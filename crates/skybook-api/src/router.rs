//! Route definitions for the SkyBook HTTP API.
//!
//! Auth routes are mounted under `/api/auth`; the health check under
//! `/api/health`. Rate limiting wraps only the credential-presenting routes.

use std::time::Duration;

use axum::routing::{get, post};
use axum::{Router, middleware as axum_middleware};
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    let api_routes = Router::new()
        .nest("/auth", auth_routes(&state))
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn(
                    middleware::logging::request_logging,
                ))
                .layer(TimeoutLayer::new(timeout)),
        )
        .with_state(state)
}

/// Auth endpoints, including the legacy `signup`/`signin` aliases.
fn auth_routes(state: &AppState) -> Router<AppState> {
    let login = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/signin", post(handlers::auth::login))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::login_rate_limit,
        ));

    let refresh = Router::new()
        .route("/refresh", post(handlers::auth::refresh))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::refresh_rate_limit,
        ));

    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/signup", post(handlers::auth::register))
        .route("/logout", post(handlers::auth::logout))
        .route("/logout-all", post(handlers::auth::logout_all))
        .route("/logout-device", post(handlers::auth::logout_device))
        .route("/change-password", post(handlers::auth::change_password))
        .route("/sessions", get(handlers::session::list_sessions))
        .route("/revoke-session", post(handlers::session::revoke_session))
        .merge(login)
        .merge(refresh)
}

/// Health check (no auth required).
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
