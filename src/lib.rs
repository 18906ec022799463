/// Stargazer: a NASA gallery backend
///
/// This library serves a JSON API over a SQLite database and the public
/// NASA APIs. It provides:
///
/// - `config`: Layered configuration (defaults, TOML file, environment, flags)
/// - `db`: Connection pool, migrations and write retries
/// - `models`: Users, sessions, favorites and feedback
/// - `repo`: Repository layer for database operations
/// - `nasa`: Cached access to APOD, EPIC, Mars rover photos and NEO feeds
/// - `session`: Cookie-backed guest and user sessions
/// - `handlers`: HTTP handlers for the API routes
///
/// The main entry point is [`create_app`], which builds the router for the
/// server binary and the integration tests.

pub mod auth;
pub mod config;
pub mod db;
pub mod dto;
pub mod errors;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod nasa;
pub mod repo;
pub mod schema;
pub mod session;
pub mod validation;

#[cfg(test)]
pub mod test_utils;

use std::sync::Arc;

use axum::{
    extract::FromRef,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post},
    Router,
};
use tokio::task::JoinHandle;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::db::DbPool;
use crate::nasa::{NasaService, NasaSource};

pub use db::run_migrations;

/// Shared state handed to every handler
///
/// Handlers extract only the part they need (`State<Arc<DbPool>>`,
/// `State<Arc<NasaService>>`, ...) through the [`FromRef`] impls below.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<DbPool>,
    pub nasa: Arc<NasaService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pool: Arc<DbPool>, config: Config, nasa: NasaService) -> Self {
        Self {
            pool,
            nasa: Arc::new(nasa),
            config: Arc::new(config),
        }
    }

    /// Builds state around a NASA source, caching for the configured duration
    pub fn with_source(pool: Arc<DbPool>, config: Config, source: Arc<dyn NasaSource>) -> Self {
        let nasa = NasaService::new(source, config.cache_duration());
        Self::new(pool, config, nasa)
    }
}

impl FromRef<AppState> for Arc<DbPool> {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<NasaService> {
    fn from_ref(state: &AppState) -> Self {
        state.nasa.clone()
    }
}

impl FromRef<AppState> for Arc<Config> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

/// Creates the application router
///
/// ### Arguments
///
/// * `state` - The shared application state
///
/// ### Returns
///
/// An Axum Router with all routes, the session middleware, request tracing,
/// and CORS when an origin is configured
pub fn create_app(state: AppState) -> Router {
    let router = Router::new()
        // NASA proxy routes
        .route("/api/nasa/apod", get(handlers::apod_handler))
        .route("/api/nasa/epic", get(handlers::epic_handler))
        .route("/api/nasa/mars-photos", get(handlers::mars_photos_handler))
        .route("/api/nasa/neo", get(handlers::neo_handler))
        // Account routes
        .route("/register", post(handlers::register_handler))
        .route("/login", post(handlers::login_handler))
        .route("/logout", post(handlers::logout_handler))
        .route("/auth/me", get(handlers::me_handler))
        // Favorite routes
        .route("/favorites", post(handlers::create_favorite_handler).get(handlers::list_favorites_handler))
        .route("/favorites/{id}", delete(handlers::delete_favorite_handler))
        // Feedback routes
        .route("/feedback", post(handlers::create_feedback_handler).get(handlers::list_feedback_handler))
        .method_not_allowed_fallback(|| async { errors::ApiError::MethodNotAllowed })
        .fallback(|| async { errors::ApiError::NotFound("Not found".to_string()) })
        .layer(middleware::from_fn_with_state(state.clone(), session::session_middleware))
        .layer(TraceLayer::new_for_http());

    let router = match cors_layer(state.config.cors_origin.as_deref()) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.with_state(state)
}

/// Builds a CORS layer allowing credentialed requests from one origin
fn cors_layer(origin: Option<&str>) -> Option<CorsLayer> {
    let origin = origin?;
    match origin.parse::<HeaderValue>() {
        Ok(origin) => Some(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true),
        ),
        Err(err) => {
            warn!("Ignoring invalid CORS origin {:?}: {}", origin, err);
            None
        }
    }
}

/// Runs one maintenance pass
///
/// Drops expired cache entries, then expired sessions, then the guest
/// favorites those sessions leave behind.
pub async fn run_maintenance(state: &AppState) {
    let purged_cache = state.nasa.purge_expired();

    let lifetime = chrono::Duration::from_std(state.config.session_lifetime()).unwrap_or(chrono::Duration::MAX);
    let purged_sessions = match repo::purge_expired_sessions(&state.pool, lifetime).await {
        Ok(purged) => purged,
        Err(err) => {
            error!("Failed to purge expired sessions: {:#}", err);
            return;
        }
    };

    match repo::purge_orphaned_guest_favorites(&state.pool).await {
        Ok(purged_favorites) => info!(purged_cache, purged_sessions, purged_favorites, "Maintenance pass complete"),
        Err(err) => error!("Failed to purge orphaned favorites: {:#}", err),
    }
}

/// Spawns the periodic maintenance task
///
/// The first pass runs one full interval after startup.
pub fn spawn_maintenance(state: AppState) -> JoinHandle<()> {
    let period = state.config.maintenance_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            run_maintenance(&state).await;
        }
    })
}
