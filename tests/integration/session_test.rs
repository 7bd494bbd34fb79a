//! Integration tests for session listing, revocation, device binding and
//! password change.

mod helpers;

use axum::http::StatusCode;
use chrono::Duration;
use serde_json::{Value, json};

use helpers::{STRONG_PASSWORD, TestApp, TestRequest};

const NEW_PASSWORD: &str = "Fresh!Passw0rd1";

async fn refresh_status(app: &TestApp, refresh_token: &str, device_id: Option<&str>) -> StatusCode {
    let mut body = json!({ "refreshToken": refresh_token });
    if let Some(device) = device_id {
        body["deviceId"] = json!(device);
    }
    app.request("POST", "/api/auth/refresh", Some(body), None)
        .await
        .status
}

async fn sessions(app: &TestApp, access_token: &str) -> Vec<Value> {
    let response = app
        .request("GET", "/api/auth/sessions", None, Some(access_token))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    response.body.as_array().cloned().unwrap_or_default()
}

#[tokio::test]
async fn test_sessions_list_metadata_without_secrets() {
    let app = TestApp::new().await;
    app.register("alice", STRONG_PASSWORD).await;

    let response = app
        .send(
            TestRequest::new("POST", "/api/auth/login")
                .json(json!({ "username": "alice", "password": STRONG_PASSWORD }))
                .header("X-Device-Id", "phone")
                .header("User-Agent", "SkyBookApp/2.1")
                .peer([192, 168, 1, 20]),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let phone = response.tokens();

    app.clock.advance(Duration::seconds(1));
    app.login_on_device("alice", STRONG_PASSWORD, Some("laptop"))
        .await;

    let listed = sessions(&app, &phone.access_token).await;
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["deviceId"], "laptop");
    assert_eq!(listed[1]["deviceId"], "phone");
    assert_eq!(listed[1]["userAgent"], "SkyBookApp/2.1");
    assert_eq!(listed[1]["ipAddress"], "192.168.1.20");
    assert!(listed[1]["expiresAt"].is_string());

    let raw = serde_json::to_string(&listed).unwrap();
    assert!(!raw.contains(&phone.refresh_token));
    assert!(!raw.contains("tokenHash"));
}

#[tokio::test]
async fn test_logout_device_only_ends_that_device() {
    let app = TestApp::new().await;
    app.register("alice", STRONG_PASSWORD).await;

    let phone = app
        .login_on_device("alice", STRONG_PASSWORD, Some("phone"))
        .await;
    let laptop = app
        .login_on_device("alice", STRONG_PASSWORD, Some("laptop"))
        .await;

    let response = app
        .request(
            "POST",
            "/api/auth/logout-device",
            Some(json!({ "deviceId": "phone" })),
            Some(&laptop.access_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    assert_eq!(
        refresh_status(&app, &phone.refresh_token, None).await,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        refresh_status(&app, &laptop.refresh_token, None).await,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_device_mismatch_does_not_burn_the_token() {
    let app = TestApp::new().await;
    app.register("alice", STRONG_PASSWORD).await;
    let tokens = app
        .login_on_device("alice", STRONG_PASSWORD, Some("phone"))
        .await;

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(json!({ "refreshToken": tokens.refresh_token, "deviceId": "laptop" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "DEVICE_MISMATCH");

    // The header is honoured when the body omits the device.
    let response = app
        .send(
            TestRequest::new("POST", "/api/auth/refresh")
                .json(json!({ "refreshToken": tokens.refresh_token }))
                .header("X-Device-Id", "phone"),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let rotated = response.tokens();
    let listed = sessions(&app, &rotated.access_token).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["deviceId"], "phone");
}

#[tokio::test]
async fn test_concurrent_refresh_has_one_winner() {
    let app = TestApp::new().await;
    app.register("alice", STRONG_PASSWORD).await;
    let tokens = app.login("alice", STRONG_PASSWORD).await;

    let (a, b) = tokio::join!(
        refresh_status(&app, &tokens.refresh_token, None),
        refresh_status(&app, &tokens.refresh_token, None),
    );
    let mut statuses = [a, b];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::UNAUTHORIZED]);
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let app = TestApp::new().await;
    app.register("alice", STRONG_PASSWORD).await;
    let tokens = app.login("alice", STRONG_PASSWORD).await;

    for _ in 0..2 {
        let response = app
            .request(
                "POST",
                "/api/auth/logout",
                Some(json!({ "refreshToken": tokens.refresh_token })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["message"], "Logged out");
    }
    assert_eq!(
        refresh_status(&app, &tokens.refresh_token, None).await,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_revoke_session_ownership() {
    let app = TestApp::new().await;
    app.register("alice", STRONG_PASSWORD).await;
    app.register("bob", STRONG_PASSWORD).await;
    let alice = app.login("alice", STRONG_PASSWORD).await;
    let bob = app.login("bob", STRONG_PASSWORD).await;

    let alice_session = sessions(&app, &alice.access_token).await[0]["id"].clone();

    let forbidden = app
        .request(
            "POST",
            "/api/auth/revoke-session",
            Some(json!({ "sessionId": alice_session })),
            Some(&bob.access_token),
        )
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let missing = app
        .request(
            "POST",
            "/api/auth/revoke-session",
            Some(json!({ "sessionId": "00000000-0000-7000-8000-000000000000" })),
            Some(&alice.access_token),
        )
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.error_code(), "NOT_FOUND");

    for _ in 0..2 {
        let revoked = app
            .request(
                "POST",
                "/api/auth/revoke-session",
                Some(json!({ "sessionId": alice_session })),
                Some(&alice.access_token),
            )
            .await;
        assert_eq!(revoked.status, StatusCode::OK);
    }

    assert_eq!(
        refresh_status(&app, &alice.refresh_token, None).await,
        StatusCode::UNAUTHORIZED
    );
    assert!(sessions(&app, &alice.access_token).await.is_empty());
}

#[tokio::test]
async fn test_change_password_ends_every_session() {
    let app = TestApp::new().await;
    app.register("alice", STRONG_PASSWORD).await;
    let phone = app
        .login_on_device("alice", STRONG_PASSWORD, Some("phone"))
        .await;
    let laptop = app
        .login_on_device("alice", STRONG_PASSWORD, Some("laptop"))
        .await;

    let wrong_current = app
        .request(
            "POST",
            "/api/auth/change-password",
            Some(json!({ "currentPassword": "Wrong!Pass99", "newPassword": NEW_PASSWORD })),
            Some(&phone.access_token),
        )
        .await;
    assert_eq!(wrong_current.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_current.error_code(), "INVALID_CREDENTIALS");

    let reuse = app
        .request(
            "POST",
            "/api/auth/change-password",
            Some(json!({ "currentPassword": STRONG_PASSWORD, "newPassword": STRONG_PASSWORD })),
            Some(&phone.access_token),
        )
        .await;
    assert_eq!(reuse.status, StatusCode::BAD_REQUEST);
    assert_eq!(reuse.error_code(), "POLICY_VIOLATION");

    app.clock.advance(Duration::seconds(2));
    let changed = app
        .request(
            "POST",
            "/api/auth/change-password",
            Some(json!({ "currentPassword": STRONG_PASSWORD, "newPassword": NEW_PASSWORD })),
            Some(&phone.access_token),
        )
        .await;
    assert_eq!(changed.status, StatusCode::OK);

    for token in [&phone.refresh_token, &laptop.refresh_token] {
        assert_eq!(
            refresh_status(&app, token, None).await,
            StatusCode::UNAUTHORIZED
        );
    }
    let stale = app
        .request("GET", "/api/auth/sessions", None, Some(&laptop.access_token))
        .await;
    assert_eq!(stale.status, StatusCode::UNAUTHORIZED);

    let old = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "alice", "password": STRONG_PASSWORD })),
            None,
        )
        .await;
    assert_eq!(old.status, StatusCode::UNAUTHORIZED);
    app.login("alice", NEW_PASSWORD).await;
}
