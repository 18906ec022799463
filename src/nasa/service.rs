use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use super::{mock_apod, NasaError, NasaSource, ResponseCache, Rover};

/// Number of EPIC images returned to clients
pub const EPIC_LIMIT: usize = 5;

/// Number of Mars rover photos returned to clients
pub const MARS_PHOTO_LIMIT: usize = 12;

/// Public archive serving full-size EPIC images
pub const EPIC_ARCHIVE_URL: &str = "https://epic.gsfc.nasa.gov/archive/natural";

/// Cache-aside access to the NASA API
///
/// Successful upstream responses are shaped for the gallery and cached for
/// the configured TTL. Failures are logged and degrade to an empty list
/// (or the built-in APOD entries); they are never cached.
pub struct NasaService {
    source: Arc<dyn NasaSource>,
    cache: ResponseCache,
    ttl: Duration,
}

impl NasaService {
    pub fn new(source: Arc<dyn NasaSource>, ttl: Duration) -> Self {
        Self {
            source,
            cache: ResponseCache::new(),
            ttl,
        }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Drops expired cache entries and returns how many were removed
    pub fn purge_expired(&self) -> usize {
        self.cache.purge_expired()
    }

    async fn remember<F, Fut>(&self, key: String, fetch: F) -> Option<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, NasaError>>,
    {
        if let Some(hit) = self.cache.get(&key) {
            debug!(%key, "NASA cache hit");
            return Some(hit);
        }

        match fetch().await {
            Ok(value) => {
                self.cache.insert(key, value.clone(), self.ttl);
                Some(value)
            }
            Err(err) => {
                error!(%key, error = %err, "NASA API request failed");
                None
            }
        }
    }

    /// Astronomy Pictures of the Day, falling back to built-in entries
    #[instrument(skip(self))]
    pub async fn apod(&self, count: u32) -> Value {
        let source = &self.source;
        self.remember(format!("nasa_apod_{}", count), || async move {
            let value = source.apod(count).await?;
            if is_empty(&value) {
                return Err(NasaError::Empty);
            }
            Ok(value)
        })
        .await
        .unwrap_or_else(|| {
            warn!(count, "Serving mock APOD data");
            mock_apod(count)
        })
    }

    /// The latest EPIC images, each with a full-size `image_url`
    #[instrument(skip(self))]
    pub async fn epic(&self) -> Value {
        let source = &self.source;
        self.remember("nasa_epic_latest".to_string(), || async move {
            shape_epic(source.epic_natural().await?)
        })
        .await
        .unwrap_or_else(empty_list)
    }

    /// Photos taken by `rover` on martian day `sol`
    #[instrument(skip(self))]
    pub async fn mars_photos(&self, rover: Rover, sol: u32) -> Value {
        let source = &self.source;
        self.remember(format!("nasa_mars_photos_{}_{}", rover, sol), || async move {
            Ok(shape_mars(source.mars_photos(rover, sol).await?))
        })
        .await
        .unwrap_or_else(empty_list)
    }

    /// Near Earth Objects approaching between `start` and `end`
    #[instrument(skip(self))]
    pub async fn neo(&self, start: NaiveDate, end: NaiveDate) -> Value {
        let source = &self.source;
        let key = format!("nasa_neo_{}_{}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"));
        self.remember(key, || async move { source.neo_feed(start, end).await })
            .await
            .unwrap_or_else(empty_list)
    }
}

fn empty_list() -> Value {
    Value::Array(Vec::new())
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Builds the archive URL of an EPIC image from its `date` and `image` fields
///
/// EPIC dates look like `2024-11-01 00:31:45`; the archive is laid out by day
/// as `YYYY/MM/DD`.
pub fn epic_image_url(record: &Value) -> Option<String> {
    let image = record.get("image")?.as_str()?;
    let date = record.get("date")?.as_str()?;

    let day = match NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M:%S") {
        Ok(timestamp) => timestamp.date(),
        Err(_) => NaiveDate::parse_from_str(date.get(..10)?, "%Y-%m-%d").ok()?,
    };

    Some(format!("{}/{}/png/{}.png", EPIC_ARCHIVE_URL, day.format("%Y/%m/%d"), image))
}

fn shape_epic(value: Value) -> Result<Value, NasaError> {
    let Value::Array(records) = value else {
        return Err(NasaError::Malformed("expected a list of EPIC images"));
    };

    let shaped = records
        .into_iter()
        .take(EPIC_LIMIT)
        .map(|mut record| {
            match epic_image_url(&record) {
                Some(url) => {
                    if let Some(fields) = record.as_object_mut() {
                        fields.insert("image_url".to_string(), Value::String(url));
                    }
                }
                None => warn!("EPIC record without usable date/image fields"),
            }
            record
        })
        .collect();

    Ok(Value::Array(shaped))
}

fn shape_mars(mut value: Value) -> Value {
    match value.get_mut("photos").map(Value::take) {
        Some(Value::Array(photos)) => Value::Array(photos.into_iter().take(MARS_PHOTO_LIMIT).collect()),
        _ => empty_list(),
    }
}
