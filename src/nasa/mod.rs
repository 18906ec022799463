/// NASA API access
///
/// This module wraps the public NASA REST endpoints the gallery draws from:
/// APOD, EPIC, Mars Rover Photos and the NEO feed.
///
/// - `client`: reqwest implementation of [`NasaSource`]
/// - `cache`: in-memory TTL cache for upstream responses
/// - `service`: cache-aside access with response shaping and degradation
/// - `mock`: built-in APOD entries used when the upstream is unavailable

mod cache;
mod client;
mod mock;
mod service;

pub use cache::ResponseCache;
pub use client::NasaClient;
pub use mock::mock_apod;
pub use service::{epic_image_url, NasaService, EPIC_ARCHIVE_URL, EPIC_LIMIT, MARS_PHOTO_LIMIT};

use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while talking to the NASA API
#[derive(Debug, Error)]
pub enum NasaError {
    #[error("Request to NASA API failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("NASA API returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("NASA API returned no data")]
    Empty,
    #[error("Unexpected NASA API response: {0}")]
    Malformed(&'static str),
}

/// Mars rovers with photo archives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rover {
    #[default]
    Curiosity,
    Opportunity,
    Spirit,
    Perseverance,
}

impl Rover {
    pub const ALL: [Rover; 4] = [Rover::Curiosity, Rover::Opportunity, Rover::Spirit, Rover::Perseverance];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rover::Curiosity => "curiosity",
            Rover::Opportunity => "opportunity",
            Rover::Spirit => "spirit",
            Rover::Perseverance => "perseverance",
        }
    }

    /// Parses a rover name, ignoring case
    pub fn parse(name: &str) -> Option<Rover> {
        Rover::ALL.into_iter().find(|rover| rover.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Rover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw access to the NASA endpoints
///
/// Implementations return the upstream JSON unmodified; shaping and caching
/// happen in [`NasaService`].
#[async_trait]
pub trait NasaSource: Send + Sync {
    /// `GET /planetary/apod?count={count}`
    async fn apod(&self, count: u32) -> Result<Value, NasaError>;

    /// `GET /EPIC/api/natural`
    async fn epic_natural(&self) -> Result<Value, NasaError>;

    /// `GET /mars-photos/api/v1/rovers/{rover}/photos?sol={sol}`
    async fn mars_photos(&self, rover: Rover, sol: u32) -> Result<Value, NasaError>;

    /// `GET /neo/rest/v1/feed?start_date={start}&end_date={end}`
    async fn neo_feed(&self, start: NaiveDate, end: NaiveDate) -> Result<Value, NasaError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rover_parse() {
        assert_eq!(Rover::parse("curiosity"), Some(Rover::Curiosity));
        assert_eq!(Rover::parse("Perseverance"), Some(Rover::Perseverance));
        assert_eq!(Rover::parse("sojourner"), None);
    }

    #[test]
    fn test_rover_serde_is_lowercase() {
        assert_eq!(serde_json::to_value(Rover::Spirit).unwrap(), "spirit");
        let rover: Rover = serde_json::from_str("\"opportunity\"").unwrap();
        assert_eq!(rover, Rover::Opportunity);
    }
}
