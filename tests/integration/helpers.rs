//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use skybook_api::{AppState, build_router};
use skybook_auth::{AuthService, build_rate_limiter};
use skybook_core::config::AppConfig;
use skybook_core::config::auth::HashingConfig;
use skybook_core::traits::{Clock, ManualClock};
use skybook_database::MemoryCredentialStore;

/// Password that satisfies the default policy.
pub const STRONG_PASSWORD: &str = "Str0ng!Pass99";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Clock shared by every component
    pub clock: ManualClock,
    /// Backing store for direct inspection
    pub store: Arc<MemoryCredentialStore>,
    /// Application config
    pub config: AppConfig,
}

/// Access and refresh token pair from login or refresh.
#[derive(Debug, Clone)]
pub struct Tokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// One request to send through the router.
#[derive(Debug, Clone)]
pub struct TestRequest {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
    pub token: Option<String>,
    pub headers: Vec<(&'static str, String)>,
    pub peer: IpAddr,
}

impl TestRequest {
    pub fn new(method: &'static str, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            body: None,
            token: None,
            headers: Vec::new(),
            peer: IpAddr::V4(Ipv4Addr::LOCALHOST),
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn bearer(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }

    pub fn peer(mut self, ip: [u8; 4]) -> Self {
        self.peer = IpAddr::from(ip);
        self
    }
}

impl TestApp {
    /// Create a test application with generous rate limits.
    pub async fn new() -> Self {
        Self::with_config(|config| {
            config.rate_limit.login.capacity = 1000;
            config.rate_limit.refresh.capacity = 1000;
        })
        .await
    }

    /// Create a test application after adjusting the test configuration.
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "integration-test-secret-0123456789abcdef".to_string();
        config.auth.hashing = HashingConfig {
            memory_kib: 256,
            iterations: 1,
            parallelism: 1,
        };
        adjust(&mut config);
        config.validate().expect("Invalid test config");

        let clock = ManualClock::new(chrono::Utc::now());
        let shared_clock: Arc<dyn Clock> = Arc::new(clock.clone());
        let store = Arc::new(MemoryCredentialStore::new());

        let rate_limiter = build_rate_limiter(&config.rate_limit, shared_clock.clone())
            .await
            .expect("Failed to build rate limiter");
        let auth = AuthService::new(store.clone(), &config.auth, shared_clock)
            .expect("Failed to build auth service");

        let router = build_router(AppState::new(config.clone(), auth, rate_limiter));

        Self {
            router,
            clock,
            store,
            config,
        }
    }

    /// Register a user with the default role.
    pub async fn register(&self, username: &str, password: &str) {
        let response = self
            .request(
                "POST",
                "/api/auth/register",
                Some(serde_json::json!({
                    "username": username,
                    "email": format!("{username}@test.com"),
                    "password": password,
                })),
                None,
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Registration failed: {:?}",
            response.body
        );
    }

    /// Login and return the token pair.
    pub async fn login(&self, username: &str, password: &str) -> Tokens {
        self.login_on_device(username, password, None).await
    }

    /// Login with an optional `X-Device-Id` header.
    pub async fn login_on_device(
        &self,
        username: &str,
        password: &str,
        device_id: Option<&str>,
    ) -> Tokens {
        let mut req = TestRequest::new("POST", "/api/auth/login").json(serde_json::json!({
            "username": username,
            "password": password,
        }));
        if let Some(device) = device_id {
            req = req.header("X-Device-Id", device);
        }
        let response = self.send(req).await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );
        response.tokens()
    }

    /// Make an HTTP request to the test app from the default peer.
    pub async fn request(
        &self,
        method: &'static str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = TestRequest::new(method, path);
        req.body = body;
        req.token = token.map(String::from);
        self.send(req).await
    }

    /// Send a fully described request.
    pub async fn send(&self, request: TestRequest) -> TestResponse {
        let body_str = request
            .body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(request.method)
            .uri(request.path)
            .header("Content-Type", "application/json")
            .extension(MockConnectInfo(SocketAddr::new(request.peer, 40000)));

        if let Some(token) = request.token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        for (name, value) in request.headers {
            req = req.header(name, value);
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `error` code of an error body.
    pub fn error_code(&self) -> &str {
        self.body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Parsed `Retry-After` header.
    pub fn retry_after(&self) -> Option<u64> {
        self.headers
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
    }

    /// Token pair of a login or refresh response.
    pub fn tokens(&self) -> Tokens {
        let field = |name: &str| {
            self.body
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_else(|| panic!("No {name} in response: {:?}", self.body))
                .to_string()
        };
        Tokens {
            access_token: field("accessToken"),
            refresh_token: field("refreshToken"),
        }
    }
}
