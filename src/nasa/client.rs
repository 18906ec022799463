use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client as HttpClient;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::{NasaError, NasaSource, Rover};
use crate::config::Config;

/// HTTP client for the NASA REST API
///
/// Every request carries the configured `api_key` query parameter and is
/// bounded by the configured timeout.
#[derive(Debug, Clone)]
pub struct NasaClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
}

impl NasaClient {
    /// Creates a new NASA client
    ///
    /// ### Arguments
    ///
    /// * `base_url` - Base URL of the API, e.g. `https://api.nasa.gov`
    /// * `api_key` - The key sent with each request
    /// * `timeout` - Total time allowed for each request
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self, NasaError> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .user_agent(concat!("stargazer/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Creates a client from the server configuration
    pub fn from_config(config: &Config) -> Result<Self, NasaError> {
        if config.nasa_api_key == "DEMO_KEY" {
            warn!("Using NASA DEMO_KEY; requests are heavily rate limited");
        }
        Self::new(config.nasa_base_url.clone(), config.nasa_api_key.clone(), config.http_timeout())
    }

    async fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value, NasaError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "Requesting NASA API");

        let response = self
            .http
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NasaError::Status { status: status.as_u16(), body });
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl NasaSource for NasaClient {
    #[instrument(skip(self))]
    async fn apod(&self, count: u32) -> Result<Value, NasaError> {
        self.get_json("/planetary/apod", &[("count", count.to_string())]).await
    }

    #[instrument(skip(self))]
    async fn epic_natural(&self) -> Result<Value, NasaError> {
        self.get_json("/EPIC/api/natural", &[]).await
    }

    #[instrument(skip(self))]
    async fn mars_photos(&self, rover: Rover, sol: u32) -> Result<Value, NasaError> {
        let path = format!("/mars-photos/api/v1/rovers/{}/photos", rover);
        self.get_json(&path, &[("sol", sol.to_string())]).await
    }

    #[instrument(skip(self))]
    async fn neo_feed(&self, start: NaiveDate, end: NaiveDate) -> Result<Value, NasaError> {
        self.get_json(
            "/neo/rest/v1/feed",
            &[
                ("start_date", start.format("%Y-%m-%d").to_string()),
                ("end_date", end.format("%Y-%m-%d").to_string()),
            ],
        ).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::{Path, Query}, http::StatusCode, routing::get, Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    /// Starts a stub NASA API on a random local port and returns its base URL
    ///
    /// Each endpoint echoes back the query parameters it received so tests can
    /// check what the client sent.
    async fn spawn_stub() -> String {
        let app = Router::new()
            .route("/planetary/apod", get(|Query(q): Query<HashMap<String, String>>| async move {
                Json(json!([{ "title": "Stub", "query": q }]))
            }))
            .route("/EPIC/api/natural", get(|Query(q): Query<HashMap<String, String>>| async move {
                Json(json!([{ "image": "epic_1b_20241101003633", "date": "2024-11-01 00:31:45", "query": q }]))
            }))
            .route("/mars-photos/api/v1/rovers/{rover}/photos", get(
                |Path(rover): Path<String>, Query(q): Query<HashMap<String, String>>| async move {
                    Json(json!({ "rover": rover, "query": q, "photos": [] }))
                },
            ))
            .route("/neo/rest/v1/feed", get(|| async {
                (StatusCode::TOO_MANY_REQUESTS, "rate limited")
            }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn test_apod_sends_key_and_count() {
        let base_url = spawn_stub().await;
        let client = NasaClient::new(base_url, "test-key", Duration::from_secs(5)).unwrap();

        let value = client.apod(6).await.unwrap();

        assert_eq!(value[0]["title"], "Stub");
        assert_eq!(value[0]["query"]["api_key"], "test-key");
        assert_eq!(value[0]["query"]["count"], "6");
    }

    #[tokio::test]
    async fn test_epic_natural_returns_raw_records() {
        let base_url = spawn_stub().await;
        let client = NasaClient::new(base_url, "test-key", Duration::from_secs(5)).unwrap();

        let value = client.epic_natural().await.unwrap();

        assert_eq!(value[0]["image"], "epic_1b_20241101003633");
        assert!(value[0].get("image_url").is_none());
    }

    #[tokio::test]
    async fn test_mars_photos_uses_rover_path_and_sol() {
        let base_url = spawn_stub().await;
        let client = NasaClient::new(base_url, "test-key", Duration::from_secs(5)).unwrap();

        let value = client.mars_photos(Rover::Perseverance, 42).await.unwrap();

        assert_eq!(value["rover"], "perseverance");
        assert_eq!(value["query"]["sol"], "42");
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let base_url = spawn_stub().await;
        let client = NasaClient::new(base_url, "test-key", Duration::from_secs(5)).unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 11, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 11, 8).unwrap();

        let err = client.neo_feed(start, end).await.unwrap_err();

        match err {
            NasaError::Status { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("Expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_is_request_error() {
        // Bind then drop a listener so the port is very likely closed
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = NasaClient::new(format!("http://{}", addr), "k", Duration::from_secs(2)).unwrap();
        let err = client.epic_natural().await.unwrap_err();

        assert!(matches!(err, NasaError::Request(_)), "got {:?}", err);
    }
}
