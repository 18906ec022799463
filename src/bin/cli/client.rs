use axum_extra::extract::cookie::Cookie;
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use stargazer::dto::{
    AuthResponse, CreateFavoriteDto, CreateFeedbackDto, FavoriteResponse, FeedbackResponse,
    LoginDto, MeResponse, MessageResponse, RegisterDto,
};
use stargazer::models::{Favorite, Feedback};
use stargazer::session::SESSION_COOKIE;

/// Error type for CLI client operations
#[derive(Debug)]
pub enum ClientError {
    /// Server returned an error status with a message body
    Server { status: StatusCode, message: String },
    /// Network/connection/request error
    Request(reqwest::Error),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Server { status, message } => {
                write!(f, "Server error ({}): {}", status.as_u16(), message)
            }
            ClientError::Request(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Request(err) => Some(err),
            ClientError::Server { .. } => None,
        }
    }
}

/// Extension trait for checking HTTP responses and extracting server error messages
trait ResponseExt {
    /// Checks for error status and extracts the server's error message body
    async fn check(self) -> Result<reqwest::Response, ClientError>;
}

impl ResponseExt for reqwest::Response {
    async fn check(self) -> Result<reqwest::Response, ClientError> {
        if self.status().is_success() {
            return Ok(self);
        }
        let status = self.status();
        let message = match self.json::<Value>().await {
            Ok(body) => body.get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("Unknown error")
                .to_string(),
            Err(_) => format!("HTTP {}", status),
        };
        Err(ClientError::Server { status, message })
    }
}

/// Reads the session token a response hands out, if any
pub fn session_from_response(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| Cookie::parse(value.to_string()).ok())
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

/// A decoded response body together with the session token the server set
pub struct WithSession<T> {
    pub body: T,
    pub session: Option<String>,
}

/// HTTP client wrapper for communicating with the Stargazer server
pub struct StargazerClient {
    /// The base URL of the server (e.g. "http://localhost:3000")
    base_url: String,
    /// Session token sent as the session cookie, if any
    session: Option<String>,
    /// The underlying HTTP client
    client: Client,
}

impl StargazerClient {
    /// Creates a new StargazerClient
    ///
    /// ### Arguments
    ///
    /// * `base_url` - The base URL of the Stargazer server
    /// * `session` - A session token from a previous `account` command
    pub fn new(base_url: String, session: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            client: Client::new(),
        }
    }

    fn with_session(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.session {
            Some(token) => request.header(COOKIE, format!("{}={}", SESSION_COOKIE, token)),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<WithSession<T>, ClientError> {
        let response = self
            .with_session(request)
            .send()
            .await
            .map_err(ClientError::Request)?
            .check()
            .await?;
        let session = session_from_response(&response);
        let body = response.json().await.map_err(ClientError::Request)?;
        Ok(WithSession { body, session })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        Ok(self.send(self.client.get(&url).query(query)).await?.body)
    }

    // ── NASA endpoints ───────────────────────────────────────────────

    /// Fetches Astronomy Pictures of the Day
    pub async fn apod(&self, count: u32) -> Result<Value, ClientError> {
        self.get("/api/nasa/apod", &[("count", count.to_string())]).await
    }

    /// Fetches the latest EPIC images
    pub async fn epic(&self) -> Result<Value, ClientError> {
        self.get("/api/nasa/epic", &[]).await
    }

    /// Fetches Mars rover photos for a sol
    pub async fn mars_photos(&self, rover: &str, sol: u32) -> Result<Value, ClientError> {
        self.get(
            "/api/nasa/mars-photos",
            &[("rover", rover.to_string()), ("sol", sol.to_string())],
        ).await
    }

    /// Fetches the Near Earth Object feed
    pub async fn neo(&self, start_date: Option<String>, end_date: Option<String>) -> Result<Value, ClientError> {
        let mut query = Vec::new();
        if let Some(start) = start_date {
            query.push(("start_date", start));
        }
        if let Some(end) = end_date {
            query.push(("end_date", end));
        }
        self.get("/api/nasa/neo", &query).await
    }

    // ── Favorite endpoints ───────────────────────────────────────────

    /// Lists the favorites visible to the current session
    pub async fn list_favorites(&self) -> Result<Vec<Favorite>, ClientError> {
        self.get("/favorites", &[]).await
    }

    /// Saves an item as a favorite
    pub async fn add_favorite(&self, dto: &CreateFavoriteDto) -> Result<WithSession<FavoriteResponse>, ClientError> {
        let url = format!("{}/favorites", self.base_url);
        self.send(self.client.post(&url).json(dto)).await
    }

    /// Removes a favorite
    pub async fn remove_favorite(&self, id: &str) -> Result<MessageResponse, ClientError> {
        let url = format!("{}/favorites/{}", self.base_url, id);
        Ok(self.send(self.client.delete(&url)).await?.body)
    }

    // ── Feedback endpoints ───────────────────────────────────────────

    /// Lists all feedback
    pub async fn list_feedback(&self) -> Result<Vec<Feedback>, ClientError> {
        self.get("/feedback", &[]).await
    }

    /// Sends feedback
    pub async fn send_feedback(&self, dto: &CreateFeedbackDto) -> Result<FeedbackResponse, ClientError> {
        let url = format!("{}/feedback", self.base_url);
        Ok(self.send(self.client.post(&url).json(dto)).await?.body)
    }

    // ── Account endpoints ────────────────────────────────────────────

    /// Registers an account; the response carries the logged-in session
    pub async fn register(&self, dto: &RegisterDto) -> Result<WithSession<AuthResponse>, ClientError> {
        let url = format!("{}/register", self.base_url);
        self.send(self.client.post(&url).json(dto)).await
    }

    /// Logs in; the response carries the logged-in session
    pub async fn login(&self, dto: &LoginDto) -> Result<WithSession<AuthResponse>, ClientError> {
        let url = format!("{}/login", self.base_url);
        self.send(self.client.post(&url).json(dto)).await
    }

    /// Logs out; the response carries the replacement guest session
    pub async fn logout(&self) -> Result<WithSession<MessageResponse>, ClientError> {
        let url = format!("{}/logout", self.base_url);
        self.send(self.client.post(&url)).await
    }

    /// Fetches the user bound to the current session
    pub async fn me(&self) -> Result<MeResponse, ClientError> {
        self.get("/auth/me", &[]).await
    }
}
