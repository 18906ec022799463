use crate::db::{with_retry, DbPool};
use crate::models::Feedback;
use crate::schema::feedback;
use anyhow::Result;
use diesel::prelude::*;
use tracing::{debug, info, instrument};

/// Stores a feedback message
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `name` - Name of the visitor leaving feedback
/// * `email` - Their email address
/// * `message` - The feedback text
/// * `rating` - Star rating from 1 to 5
///
/// ### Returns
///
/// A Result containing the stored Feedback if successful
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The insert fails, including when the rating is out of range
#[instrument(skip(pool, message), fields(email = %email, rating = rating))]
pub async fn create_feedback(
    pool: &DbPool,
    name: String,
    email: String,
    message: String,
    rating: i32,
) -> Result<Feedback> {
    let new_feedback = Feedback::new(name, email, message, rating);

    let conn = &mut pool.get()?;
    with_retry(conn, |conn| {
        diesel::insert_into(feedback::table)
            .values(&new_feedback)
            .execute(conn)
    }).await?;

    info!("Stored feedback {}", new_feedback.get_id());
    Ok(new_feedback)
}

/// Lists all feedback, newest first
#[instrument(skip(pool))]
pub fn list_feedback(pool: &DbPool) -> Result<Vec<Feedback>> {
    let conn = &mut pool.get()?;
    let result = feedback::table
        .order(feedback::created_at.desc())
        .load::<Feedback>(conn)?;

    debug!("Retrieved {} feedback entries", result.len());
    Ok(result)
}
