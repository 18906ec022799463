//! Common test utilities for Stargazer integration tests
//!
//! This file contains the test application setup, a stub NASA source, and
//! request helpers that carry the session cookie between calls the way a
//! browser would.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use serde_json::Value;
use stargazer::{
    config::base_config,
    create_app,
    db::init_pool,
    nasa::{NasaError, NasaSource, Rover},
    session::SESSION_COOKIE,
    AppState,
};
use std::sync::{Arc, Mutex};
use tower::Service;

/// Stand-in for the NASA API answering from fixed values
///
/// Endpoints without a configured value answer with a 503.
#[derive(Default)]
pub struct StubNasa {
    pub apod: Option<Value>,
    pub epic: Option<Value>,
    pub mars: Option<Value>,
    pub neo: Option<Value>,
    pub requests: Mutex<Vec<String>>,
}

impl StubNasa {
    fn answer(&self, request: String, value: &Option<Value>) -> Result<Value, NasaError> {
        self.requests.lock().unwrap().push(request);
        value.clone().ok_or(NasaError::Status {
            status: 503,
            body: "Service Unavailable".to_string(),
        })
    }
}

#[async_trait]
impl NasaSource for StubNasa {
    async fn apod(&self, count: u32) -> Result<Value, NasaError> {
        self.answer(format!("apod:{}", count), &self.apod)
    }

    async fn epic_natural(&self) -> Result<Value, NasaError> {
        self.answer("epic".to_string(), &self.epic)
    }

    async fn mars_photos(&self, rover: Rover, sol: u32) -> Result<Value, NasaError> {
        self.answer(format!("mars:{}:{}", rover, sol), &self.mars)
    }

    async fn neo_feed(&self, start: NaiveDate, end: NaiveDate) -> Result<Value, NasaError> {
        self.answer(format!("neo:{}:{}", start, end), &self.neo)
    }
}

/// Creates a test application over a shared in-memory SQLite database
///
/// Each call gets its own uniquely named database so tests stay isolated
/// while every pooled connection sees the same data.
pub fn create_test_app(nasa: Arc<StubNasa>) -> Router {
    let database_url = format!("file:it_{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
    let pool = init_pool(&database_url).unwrap();

    let conn = &mut pool.get().unwrap();
    stargazer::run_migrations(conn).unwrap();

    let state = AppState::with_source(Arc::new(pool), base_config(None), nasa);
    create_app(state)
}

/// A test application whose NASA endpoints all fail
pub fn create_offline_app() -> Router {
    create_test_app(Arc::new(StubNasa::default()))
}

/// A decoded response
pub struct TestResponse {
    pub status: StatusCode,
    /// The session cookie value the response set, if any
    pub session: Option<String>,
    pub body: Value,
}

/// Sends a request, attaching `session` as the session cookie
///
/// ### Arguments
///
/// * `app` - The test application
/// * `method` - HTTP method
/// * `uri` - Request path and query
/// * `session` - Session cookie value to send, if any
/// * `body` - JSON body, if any
pub async fn send(
    app: &mut Router,
    method: &str,
    uri: &str,
    session: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut request = Request::builder().uri(uri).method(method);
    if let Some(session) = session {
        request = request.header(header::COOKIE, format!("{}={}", SESSION_COOKIE, session));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.call(request).await.unwrap();
    let status = response.status();
    let session = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| {
            let (pair, _) = value.split_once(';').unwrap_or((value, ""));
            pair.strip_prefix(&format!("{}=", SESSION_COOKIE)).map(str::to_string)
        });

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    TestResponse { status, session, body }
}

/// Opens a guest session and returns its cookie value
pub async fn start_session(app: &mut Router) -> String {
    let response = send(app, "GET", "/auth/me", None, None).await;
    response.session.expect("expected a session cookie")
}

/// Registers a user from the given session and returns the logged-in session
pub async fn register(app: &mut Router, session: &str, name: &str, email: &str, password: &str) -> String {
    let response = send(
        app,
        "POST",
        "/register",
        Some(session),
        Some(serde_json::json!({
            "name": name,
            "email": email,
            "password": password,
            "password_confirmation": password
        })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED, "register failed: {}", response.body);
    response.session.expect("expected a rotated session cookie")
}
