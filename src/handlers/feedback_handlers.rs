use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::WithRejection;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::db::DbPool;
use crate::dto::{CreateFeedbackDto, FeedbackResponse};
use crate::errors::ApiError;
use crate::models::Feedback;
use crate::repo;

/// Handler for leaving feedback
///
/// This function handles POST requests to `/feedback`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `payload` - The feedback form; `rating` defaults to 5
///
/// ### Returns
///
/// 201 with the stored feedback
#[instrument(skip(pool, payload))]
pub async fn create_feedback_handler(
    State(pool): State<Arc<DbPool>>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateFeedbackDto>, ApiError>,
) -> Result<(StatusCode, Json<FeedbackResponse>), ApiError> {
    let entry = payload.validate()?;

    let feedback = repo::create_feedback(&pool, entry.name, entry.email, entry.message, entry.rating).await?;
    info!(rating = feedback.get_rating(), "Feedback received");

    Ok((
        StatusCode::CREATED,
        Json(FeedbackResponse {
            message: "Thank you for your feedback!".to_string(),
            feedback,
        }),
    ))
}

/// Handler for listing feedback
///
/// This function handles GET requests to `/feedback`.
#[instrument(skip(pool))]
pub async fn list_feedback_handler(
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<Vec<Feedback>>, ApiError> {
    Ok(Json(repo::list_feedback(&pool)?))
}
