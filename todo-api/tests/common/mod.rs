//! Common test utilities for integration tests
//!
//! - A router over the in-memory store with a fixed test configuration
//! - Request builders and a `send` helper that decodes the envelope
//! - Helpers to register users and create tasks through the API

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use serde_json::{json, Value};
use todo_api::app::{build_router, AppState};
use todo_api::config::Config;
use todo_shared::store::memory::MemoryStore;
use tower::Service as _;
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";
pub const TEST_PASSWORD: &str = "secret123";

/// Test context holding a fresh router and its configuration
pub struct TestContext {
    pub app: axum::Router,
    pub config: Config,
}

/// A registered user and their access token
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

impl TestUser {
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    pub fn tasks_uri(&self) -> String {
        format!("/api/{}/tasks", self.id)
    }

    pub fn task_uri(&self, task_id: &str) -> String {
        format!("/api/{}/tasks/{}", self.id, task_id)
    }
}

/// Decoded response
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// `data` field of the envelope
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// `error.code` field of the envelope
    pub fn error_code(&self) -> &str {
        self.body["error"]["code"].as_str().unwrap_or_default()
    }
}

impl TestContext {
    /// Creates a context over an empty in-memory store
    pub fn new() -> Self {
        Self::with_vars(&[])
    }

    /// Creates a context with extra configuration variables
    pub fn with_vars(extra: &[(&str, &str)]) -> Self {
        let mut vars: HashMap<String, String> = HashMap::from([
            ("JWT_SECRET".to_string(), TEST_SECRET.to_string()),
            ("STORAGE_BACKEND".to_string(), "memory".to_string()),
        ]);
        for (key, value) in extra {
            vars.insert(key.to_string(), value.to_string());
        }

        let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
        let state = AppState::new(Arc::new(MemoryStore::new()), config.clone());

        TestContext {
            app: build_router(state),
            config,
        }
    }

    /// Sends a request through the router and decodes the body
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().call(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("Non-JSON body ({}): {}", status, String::from_utf8_lossy(&bytes))
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Registers a user and resolves their id through `/api/auth/me`
    pub async fn register(&self, email: &str) -> TestUser {
        let response = self
            .send(json_request(
                Method::POST,
                "/api/auth/register",
                None,
                json!({"email": email, "password": TEST_PASSWORD}),
            ))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);

        let token = response.data()["access_token"].as_str().unwrap().to_string();
        let me = self
            .send(request(Method::GET, "/api/auth/me", Some(&token)))
            .await;
        assert_eq!(me.status, StatusCode::OK, "{:?}", me.body);

        TestUser {
            id: me.data()["id"].as_str().unwrap().parse().unwrap(),
            email: email.to_string(),
            token,
        }
    }

    /// Creates a task through the API and returns its JSON
    pub async fn create_task(&self, user: &TestUser, title: &str) -> Value {
        let response = self
            .send(json_request(
                Method::POST,
                &user.tasks_uri(),
                Some(&user.token),
                json!({"title": title}),
            ))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.data().clone()
    }
}

/// Request without a body
pub fn request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

/// Request with a JSON body
pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    raw_json_request(method, uri, token, &body.to_string())
}

/// Request with a raw (possibly malformed) JSON body
pub fn raw_json_request(method: Method, uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Unique email for a test run
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@example.com", prefix, Uuid::new_v4())
}
