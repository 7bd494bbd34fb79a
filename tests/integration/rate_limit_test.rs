//! Integration tests for per-IP rate limiting of the credential endpoints.

mod helpers;

use axum::http::StatusCode;
use chrono::Duration;
use serde_json::json;

use helpers::{TestApp, TestRequest, TestResponse};

async fn attempt_login(app: &TestApp, path: &str, peer: [u8; 4]) -> TestResponse {
    app.send(
        TestRequest::new("POST", path)
            .json(json!({ "username": "nobody", "password": "Wrong!Pass99" }))
            .peer(peer),
    )
    .await
}

#[tokio::test]
async fn test_sixth_login_is_rate_limited_until_refill() {
    let app = TestApp::with_config(|_| {}).await;

    for _ in 0..5 {
        let response = attempt_login(&app, "/api/auth/login", [10, 0, 0, 1]).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    let denied = attempt_login(&app, "/api/auth/login", [10, 0, 0, 1]).await;
    assert_eq!(denied.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(denied.error_code(), "RATE_LIMITED");
    let retry_after = denied.retry_after().expect("Retry-After header");
    assert!(retry_after >= 1);
    assert_eq!(denied.body["retryAfterSeconds"], retry_after);

    app.clock.advance(Duration::minutes(1));
    let response = attempt_login(&app, "/api/auth/login", [10, 0, 0, 1]).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_buckets_are_per_client() {
    let app = TestApp::with_config(|_| {}).await;

    for _ in 0..5 {
        attempt_login(&app, "/api/auth/login", [10, 0, 0, 1]).await;
    }
    let denied = attempt_login(&app, "/api/auth/login", [10, 0, 0, 1]).await;
    assert_eq!(denied.status, StatusCode::TOO_MANY_REQUESTS);

    let other = attempt_login(&app, "/api/auth/login", [10, 0, 0, 2]).await;
    assert_eq!(other.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signin_shares_the_login_bucket() {
    let app = TestApp::with_config(|_| {}).await;

    for path in ["/api/auth/login", "/api/auth/signin"].iter().cycle().take(5) {
        let response = attempt_login(&app, path, [10, 0, 0, 3]).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }
    let denied = attempt_login(&app, "/api/auth/signin", [10, 0, 0, 3]).await;
    assert_eq!(denied.status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_refresh_has_its_own_bucket() {
    let app = TestApp::with_config(|config| {
        config.rate_limit.refresh.capacity = 2;
    })
    .await;

    for _ in 0..5 {
        attempt_login(&app, "/api/auth/login", [10, 0, 0, 4]).await;
    }
    assert_eq!(
        attempt_login(&app, "/api/auth/login", [10, 0, 0, 4]).await.status,
        StatusCode::TOO_MANY_REQUESTS
    );

    for expected in [
        StatusCode::UNAUTHORIZED,
        StatusCode::UNAUTHORIZED,
        StatusCode::TOO_MANY_REQUESTS,
    ] {
        let response = app
            .send(
                TestRequest::new("POST", "/api/auth/refresh")
                    .json(json!({ "refreshToken": "unknown" }))
                    .peer([10, 0, 0, 4]),
            )
            .await;
        assert_eq!(response.status, expected);
    }
}

#[tokio::test]
async fn test_other_endpoints_are_not_limited() {
    let app = TestApp::with_config(|_| {}).await;

    for _ in 0..10 {
        let response = app
            .send(
                TestRequest::new("POST", "/api/auth/logout")
                    .json(json!({ "refreshToken": "unknown" }))
                    .peer([10, 0, 0, 5]),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_disabled_limiter_admits_everything() {
    let app = TestApp::with_config(|config| {
        config.rate_limit.enabled = false;
    })
    .await;

    for _ in 0..20 {
        let response = attempt_login(&app, "/api/auth/login", [10, 0, 0, 6]).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }
}
