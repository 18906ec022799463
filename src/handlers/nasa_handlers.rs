use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

use crate::dto::{ApodQuery, MarsQuery, NeoQuery};
use crate::errors::ApiError;
use crate::nasa::NasaService;

/// Handler for Astronomy Pictures of the Day
///
/// This function handles GET requests to `/api/nasa/apod?count=N`.
/// Upstream failures fall back to built-in entries, so the list is never
/// empty.
#[instrument(skip(nasa))]
pub async fn apod_handler(
    State(nasa): State<Arc<NasaService>>,
    WithRejection(Query(query), _): WithRejection<Query<ApodQuery>, ApiError>,
) -> Result<Json<Value>, ApiError> {
    let count = query.validate()?;
    Ok(Json(nasa.apod(count).await))
}

/// Handler for the latest EPIC Earth images
///
/// This function handles GET requests to `/api/nasa/epic`.
#[instrument(skip(nasa))]
pub async fn epic_handler(State(nasa): State<Arc<NasaService>>) -> Json<Value> {
    Json(nasa.epic().await)
}

/// Handler for Mars rover photos
///
/// This function handles GET requests to
/// `/api/nasa/mars-photos?sol=N&rover=NAME`.
#[instrument(skip(nasa))]
pub async fn mars_photos_handler(
    State(nasa): State<Arc<NasaService>>,
    WithRejection(Query(query), _): WithRejection<Query<MarsQuery>, ApiError>,
) -> Result<Json<Value>, ApiError> {
    let (rover, sol) = query.validate()?;
    Ok(Json(nasa.mars_photos(rover, sol).await))
}

/// Handler for Near Earth Objects
///
/// This function handles GET requests to
/// `/api/nasa/neo?start_date=YYYY-MM-DD&end_date=YYYY-MM-DD`. The window
/// defaults to the coming week.
#[instrument(skip(nasa))]
pub async fn neo_handler(
    State(nasa): State<Arc<NasaService>>,
    WithRejection(Query(query), _): WithRejection<Query<NeoQuery>, ApiError>,
) -> Result<Json<Value>, ApiError> {
    let (start, end) = query.validate(Utc::now().date_naive())?;
    Ok(Json(nasa.neo(start, end).await))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nasa::mock_apod;
    use crate::test_utils::{query_params, FakeNasa};
    use serde_json::json;
    use std::time::Duration;

    fn service(fake: FakeNasa) -> (Arc<FakeNasa>, Arc<NasaService>) {
        let fake = Arc::new(fake);
        let nasa = Arc::new(NasaService::new(fake.clone(), Duration::from_secs(60)));
        (fake, nasa)
    }

    #[tokio::test]
    async fn test_apod_handler_default_count() {
        let (fake, nasa) = service(FakeNasa::failing());

        let Json(value) = apod_handler(State(nasa), query_params(ApodQuery::default())).await.unwrap();

        assert_eq!(value, mock_apod(5));
        assert_eq!(fake.requests(), vec!["apod:5".to_string()]);
    }

    #[tokio::test]
    async fn test_apod_handler_rejects_bad_count() {
        let (fake, nasa) = service(FakeNasa::failing());

        let result = apod_handler(State(nasa), query_params(ApodQuery { count: Some("500".to_string()) })).await;

        assert!(matches!(result, Err(ApiError::Validation(_))));
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_epic_handler_failure_is_empty() {
        let (_, nasa) = service(FakeNasa::failing());
        let Json(value) = epic_handler(State(nasa)).await;
        assert_eq!(value, json!([]));
    }

    #[tokio::test]
    async fn test_mars_photos_handler_passes_rover_and_sol() {
        let (fake, nasa) = service(FakeNasa::failing().with_mars(json!({"photos": [{"id": 1}]})));

        let Json(value) = mars_photos_handler(
            State(nasa),
            query_params(MarsQuery { sol: Some("12".to_string()), rover: Some("opportunity".to_string()) }),
        ).await.unwrap();

        assert_eq!(value, json!([{"id": 1}]));
        assert_eq!(fake.requests(), vec!["mars:opportunity:12".to_string()]);
    }

    #[tokio::test]
    async fn test_mars_photos_handler_unknown_rover() {
        let (fake, nasa) = service(FakeNasa::failing());

        let result = mars_photos_handler(
            State(nasa),
            query_params(MarsQuery { sol: None, rover: Some("sojourner".to_string()) }),
        ).await;

        assert!(matches!(result, Err(ApiError::Validation(_))));
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_neo_handler_explicit_window() {
        let feed = json!({"element_count": 0, "near_earth_objects": {}});
        let (fake, nasa) = service(FakeNasa::failing().with_neo(feed.clone()));

        let Json(value) = neo_handler(
            State(nasa),
            query_params(NeoQuery {
                start_date: Some("2024-11-01".to_string()),
                end_date: Some("2024-11-03".to_string()),
            }),
        ).await.unwrap();

        assert_eq!(value, feed);
        assert_eq!(fake.requests(), vec!["neo:2024-11-01:2024-11-03".to_string()]);
    }
}
