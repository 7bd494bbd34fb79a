//! Integration tests for registration, login, rotation and lockout.

mod helpers;

use axum::http::StatusCode;
use chrono::Duration;
use serde_json::json;

use skybook_database::CredentialStore;

use helpers::{STRONG_PASSWORD, TestApp, TestRequest};

#[tokio::test]
async fn test_end_to_end_rotation_and_logout_all() {
    let app = TestApp::new().await;
    app.register("alice", STRONG_PASSWORD).await;

    let first = app.login("alice", STRONG_PASSWORD).await;

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refreshToken": first.refresh_token })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let second = response.tokens();
    assert_ne!(second.refresh_token, first.refresh_token);

    let reused = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refreshToken": first.refresh_token })),
            None,
        )
        .await;
    assert_eq!(reused.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reused.error_code(), "INVALID_TOKEN");

    let response = app
        .request("POST", "/api/auth/logout-all", None, Some(&second.access_token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let after = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refreshToken": second.refresh_token })),
            None,
        )
        .await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
    assert_eq!(after.error_code(), "INVALID_TOKEN");
}

#[tokio::test]
async fn test_login_response_shape() {
    let app = TestApp::new().await;
    app.register("alice", STRONG_PASSWORD).await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "alice", "password": STRONG_PASSWORD })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["tokenType"], "Bearer");
    assert_eq!(response.body["username"], "alice");
    assert_eq!(response.body["roles"], json!(["ROLE_USER"]));
    assert_eq!(response.body["accessTokenExpiresInSeconds"], 900);
    assert!(response.body["refreshToken"].as_str().unwrap().len() >= 86);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = TestApp::new().await;
    app.register("alice", STRONG_PASSWORD).await;

    let same_name = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "username": "alice",
                "email": "other@test.com",
                "password": STRONG_PASSWORD,
            })),
            None,
        )
        .await;
    assert_eq!(same_name.status, StatusCode::CONFLICT);

    let same_email = app
        .request(
            "POST",
            "/api/auth/signup",
            Some(json!({
                "username": "alice2",
                "email": "alice@test.com",
                "password": STRONG_PASSWORD,
            })),
            None,
        )
        .await;
    assert_eq!(same_email.status, StatusCode::CONFLICT);
    assert_eq!(same_email.error_code(), "CONFLICT");
}

#[tokio::test]
async fn test_registration_input_is_validated() {
    let app = TestApp::new().await;

    let weak = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "username": "bob",
                "email": "bob@test.com",
                "password": "password1",
            })),
            None,
        )
        .await;
    assert_eq!(weak.status, StatusCode::BAD_REQUEST);
    assert_eq!(weak.error_code(), "POLICY_VIOLATION");

    let bad_email = app
        .request(
            "POST",
            "/api/auth/register",
            Some(json!({
                "username": "bob",
                "email": "not-an-email",
                "password": STRONG_PASSWORD,
            })),
            None,
        )
        .await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_email.error_code(), "VALIDATION");

    let malformed = app
        .request("POST", "/api/auth/register", Some(json!({ "username": 7 })), None)
        .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signin_alias_returns_requested_roles() {
    let app = TestApp::new().await;
    let response = app
        .request(
            "POST",
            "/api/auth/signup",
            Some(json!({
                "username": "carol",
                "email": "carol@test.com",
                "password": STRONG_PASSWORD,
                "roles": ["admin", "attendee"],
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request(
            "POST",
            "/api/auth/signin",
            Some(json!({ "username": "carol", "password": STRONG_PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["roles"], json!(["ROLE_ADMIN", "ROLE_ATTENDEE"]));
}

#[tokio::test]
async fn test_unknown_user_and_wrong_password_are_indistinguishable() {
    let app = TestApp::new().await;
    app.register("alice", STRONG_PASSWORD).await;

    let wrong = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "alice", "password": "Wrong!Pass99" })),
            None,
        )
        .await;
    let unknown = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "nobody", "password": STRONG_PASSWORD })),
            None,
        )
        .await;

    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body, unknown.body);
}

#[tokio::test]
async fn test_lockout_after_max_attempts_then_unlock() {
    let app = TestApp::new().await;
    app.register("alice", STRONG_PASSWORD).await;

    for _ in 0..5 {
        let response = app
            .request(
                "POST",
                "/api/auth/login",
                Some(json!({ "username": "alice", "password": "Wrong!Pass99" })),
                None,
            )
            .await;
        assert_eq!(response.error_code(), "INVALID_CREDENTIALS");
    }

    let locked = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "alice", "password": STRONG_PASSWORD })),
            None,
        )
        .await;
    assert_eq!(locked.status, StatusCode::UNAUTHORIZED);
    assert_eq!(locked.error_code(), "ACCOUNT_LOCKED");
    assert_eq!(locked.retry_after(), Some(15 * 60));

    app.clock.advance(Duration::minutes(15));
    app.login("alice", STRONG_PASSWORD).await;

    // Counter was reset: four more failures do not lock.
    for _ in 0..4 {
        app.request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "alice", "password": "Wrong!Pass99" })),
            None,
        )
        .await;
    }
    app.login("alice", STRONG_PASSWORD).await;
}

#[tokio::test]
async fn test_disabled_account_is_refused() {
    let app = TestApp::new().await;
    app.register("alice", STRONG_PASSWORD).await;
    let tokens = app.login("alice", STRONG_PASSWORD).await;

    let user = app
        .store
        .find_user_by_username("alice")
        .await
        .unwrap()
        .unwrap();
    app.store.set_user_enabled(user.id, false).await.unwrap();

    let login = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "alice", "password": STRONG_PASSWORD })),
            None,
        )
        .await;
    assert_eq!(login.error_code(), "ACCOUNT_DISABLED");

    let sessions = app
        .request("GET", "/api/auth/sessions", None, Some(&tokens.access_token))
        .await;
    assert_eq!(sessions.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_endpoints_require_valid_bearer() {
    let app = TestApp::new().await;
    app.register("alice", STRONG_PASSWORD).await;
    let tokens = app.login("alice", STRONG_PASSWORD).await;

    let missing = app.request("GET", "/api/auth/sessions", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.error_code(), "UNAUTHENTICATED");

    let garbage = app
        .request("POST", "/api/auth/logout-all", None, Some("not.a.jwt"))
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);

    // A refresh token is not an access token.
    let wrong_kind = app
        .request("GET", "/api/auth/sessions", None, Some(&tokens.refresh_token))
        .await;
    assert_eq!(wrong_kind.status, StatusCode::UNAUTHORIZED);

    app.clock.advance(Duration::seconds(900 + 10));
    let expired = app
        .request("GET", "/api/auth/sessions", None, Some(&tokens.access_token))
        .await;
    assert_eq!(expired.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let response = app.send(TestRequest::new("GET", "/api/health")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["rateLimiter"], "local");
}
