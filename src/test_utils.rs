use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::Query;
use axum::Json;
use axum_extra::extract::WithRejection;
use chrono::NaiveDate;
use proptest::prelude::*;
use serde_json::Value;

use crate::config::base_config;
use crate::db::{self, DbPool};
use crate::errors::ApiError;
use crate::nasa::{NasaError, NasaSource, Rover};
use crate::AppState;

/// Sets up a test database with migrations applied
///
/// Plain ":memory:" gives each pooled connection its own database, so a
/// unique shared-cache URI is used instead: every connection in the pool sees
/// the same in-memory database, isolated from other tests.
pub fn setup_test_db() -> Arc<DbPool> {
    let unique_id = uuid::Uuid::new_v4();
    let database_url = format!("file:test_{}?mode=memory&cache=shared", unique_id);
    let pool = db::init_pool(&database_url).expect("Failed to create pool");

    let mut conn = pool.get().expect("Failed to get connection");
    db::run_migrations(&mut conn).expect("Failed to run migrations");

    Arc::new(pool)
}

/// Builds application state over a fresh test database and the given NASA source
pub fn setup_test_state(nasa: Arc<dyn NasaSource>) -> AppState {
    AppState::with_source(setup_test_db(), base_config(None), nasa)
}

/// Wraps a request body the way the JSON extractor hands it to a handler
pub fn json_body<T>(value: T) -> WithRejection<Json<T>, ApiError> {
    WithRejection(Json(value), PhantomData)
}

/// Wraps query parameters the way the query extractor hands them to a handler
pub fn query_params<T>(value: T) -> WithRejection<Query<T>, ApiError> {
    WithRejection(Query(value), PhantomData)
}

/// In-memory stand-in for the NASA API
///
/// Each endpoint answers with the configured value, or a 503 error when none
/// was configured. Calls are counted and described for assertions.
#[derive(Debug, Default)]
pub struct FakeNasa {
    apod: Option<Value>,
    epic: Option<Value>,
    mars: Option<Value>,
    neo: Option<Value>,
    calls: AtomicUsize,
    requests: Mutex<Vec<String>>,
}

impl FakeNasa {
    /// A fake whose every endpoint fails
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn with_apod(mut self, value: Value) -> Self {
        self.apod = Some(value);
        self
    }

    pub fn with_epic(mut self, value: Value) -> Self {
        self.epic = Some(value);
        self
    }

    pub fn with_mars(mut self, value: Value) -> Self {
        self.mars = Some(value);
        self
    }

    pub fn with_neo(mut self, value: Value) -> Self {
        self.neo = Some(value);
        self
    }

    /// Total number of upstream calls made
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Descriptions of each call, e.g. `mars:curiosity:1000`
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn respond(&self, request: String, value: &Option<Value>) -> Result<Value, NasaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        value.clone().ok_or(NasaError::Status {
            status: 503,
            body: "Service Unavailable".to_string(),
        })
    }
}

#[async_trait]
impl NasaSource for FakeNasa {
    async fn apod(&self, count: u32) -> Result<Value, NasaError> {
        self.respond(format!("apod:{}", count), &self.apod)
    }

    async fn epic_natural(&self) -> Result<Value, NasaError> {
        self.respond("epic".to_string(), &self.epic)
    }

    async fn mars_photos(&self, rover: Rover, sol: u32) -> Result<Value, NasaError> {
        self.respond(format!("mars:{}:{}", rover, sol), &self.mars)
    }

    async fn neo_feed(&self, start: NaiveDate, end: NaiveDate) -> Result<Value, NasaError> {
        self.respond(format!("neo:{}:{}", start, end), &self.neo)
    }
}

/// Generates strings mixing ASCII, unicode, whitespace and quotes
pub fn arb_messy_string() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9_./:-]{1,30}",
        "\\PC{1,30}",
        Just(" ".to_string()),
        Just("\"quoted\"".to_string()),
        Just("ünïcødé ✨".to_string()),
    ]
}

/// Generates a plausible favorite item type
pub fn arb_item_type() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("apod".to_string()),
        Just("mars".to_string()),
        Just("epic".to_string()),
        "[a-z]{1,50}",
    ]
}
