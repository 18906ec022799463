use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use axum_extra::extract::WithRejection;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::db::DbPool;
use crate::dto::{CreateFavoriteDto, FavoriteResponse, MessageResponse};
use crate::errors::ApiError;
use crate::models::{Favorite, Session};
use crate::repo;

/// Handler for saving a gallery item as a favorite
///
/// This function handles POST requests to `/favorites`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `session` - The caller's session, which determines the favorite's scope
/// * `payload` - The item to save
///
/// ### Returns
///
/// 201 with the new favorite, or 200 with the existing one when the item is
/// already saved in the caller's scope
#[instrument(skip(pool, session, payload))]
pub async fn create_favorite_handler(
    State(pool): State<Arc<DbPool>>,
    Extension(session): Extension<Session>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateFavoriteDto>, ApiError>,
) -> Result<(StatusCode, Json<FavoriteResponse>), ApiError> {
    let item = payload.validate()?;

    let (favorite, created) = repo::create_favorite(&pool, &session.owner(), &session.get_id(), item).await?;

    let (status, message) = if created {
        (StatusCode::CREATED, "Added to favorites")
    } else {
        (StatusCode::OK, "Already in favorites")
    };

    Ok((
        status,
        Json(FavoriteResponse {
            message: message.to_string(),
            favorite,
        }),
    ))
}

/// Handler for listing the caller's favorites
///
/// This function handles GET requests to `/favorites`.
///
/// ### Returns
///
/// The favorites in the caller's scope, newest first
#[instrument(skip(pool, session))]
pub async fn list_favorites_handler(
    State(pool): State<Arc<DbPool>>,
    Extension(session): Extension<Session>,
) -> Result<Json<Vec<Favorite>>, ApiError> {
    let favorites = repo::list_favorites(&pool, &session.owner())?;
    debug!("Returning {} favorites", favorites.len());
    Ok(Json(favorites))
}

/// Handler for removing a favorite
///
/// This function handles DELETE requests to `/favorites/{id}`. Favorites
/// outside the caller's scope are reported as not found.
#[instrument(skip(pool, session), fields(favorite_id = %id))]
pub async fn delete_favorite_handler(
    State(pool): State<Arc<DbPool>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !repo::delete_favorite(&pool, &session.owner(), &id).await? {
        return Err(ApiError::NotFound("Favorite not found".to_string()));
    }

    info!("Favorite removed");
    Ok(Json(MessageResponse::new("Removed from favorites")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{json_body, setup_test_db};
    use serde_json::json;

    fn payload(item_id: &str) -> CreateFavoriteDto {
        CreateFavoriteDto {
            item_type: Some("apod".to_string()),
            item_id: Some(item_id.to_string()),
            title: Some("Cosmic Pillars".to_string()),
            image_url: Some("https://apod.nasa.gov/pillars.jpg".to_string()),
            description: None,
            metadata: Some(json!("{\"hdurl\":\"https://apod.nasa.gov/pillars_hd.jpg\"}")),
        }
    }

    #[tokio::test]
    async fn test_create_favorite_handler() {
        let pool = setup_test_db();
        let session = repo::create_session(&pool, None).await.unwrap();

        let (status, Json(body)) = create_favorite_handler(
            State(pool.clone()),
            Extension(session.clone()),
            json_body(payload("2024-11-01")),
        ).await.unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.message, "Added to favorites");
        assert_eq!(body.favorite.get_session_id(), session.get_id());
        assert_eq!(body.favorite.get_user_id(), None);
        assert_eq!(
            body.favorite.get_metadata(),
            Some(json!({"hdurl": "https://apod.nasa.gov/pillars_hd.jpg"}))
        );
    }

    #[tokio::test]
    async fn test_create_favorite_handler_duplicate() {
        let pool = setup_test_db();
        let session = repo::create_session(&pool, None).await.unwrap();

        let (_, Json(first)) = create_favorite_handler(
            State(pool.clone()),
            Extension(session.clone()),
            json_body(payload("2024-11-01")),
        ).await.unwrap();
        let (status, Json(second)) = create_favorite_handler(
            State(pool.clone()),
            Extension(session.clone()),
            json_body(payload("2024-11-01")),
        ).await.unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(second.message, "Already in favorites");
        assert_eq!(second.favorite.get_id(), first.favorite.get_id());
    }

    #[tokio::test]
    async fn test_create_favorite_handler_validation() {
        let pool = setup_test_db();
        let session = repo::create_session(&pool, None).await.unwrap();

        let result = create_favorite_handler(
            State(pool.clone()),
            Extension(session),
            json_body(CreateFavoriteDto::default()),
        ).await;

        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_favorites_handler_is_scoped() {
        let pool = setup_test_db();
        let mine = repo::create_session(&pool, None).await.unwrap();
        let theirs = repo::create_session(&pool, None).await.unwrap();

        create_favorite_handler(State(pool.clone()), Extension(mine.clone()), json_body(payload("a"))).await.unwrap();
        create_favorite_handler(State(pool.clone()), Extension(theirs.clone()), json_body(payload("b"))).await.unwrap();

        let Json(favorites) = list_favorites_handler(State(pool.clone()), Extension(mine)).await.unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].get_item_id(), "a");
    }

    #[tokio::test]
    async fn test_delete_favorite_handler() {
        let pool = setup_test_db();
        let session = repo::create_session(&pool, None).await.unwrap();
        let (_, Json(created)) = create_favorite_handler(
            State(pool.clone()),
            Extension(session.clone()),
            json_body(payload("2024-11-01")),
        ).await.unwrap();

        let Json(body) = delete_favorite_handler(
            State(pool.clone()),
            Extension(session.clone()),
            Path(created.favorite.get_id()),
        ).await.unwrap();
        assert_eq!(body.message, "Removed from favorites");

        let again = delete_favorite_handler(
            State(pool.clone()),
            Extension(session),
            Path(created.favorite.get_id()),
        ).await;
        match again {
            Err(ApiError::NotFound(message)) => assert_eq!(message, "Favorite not found"),
            other => panic!("Expected not found, got {:?}", other.map(|j| j.0)),
        }
    }

    #[tokio::test]
    async fn test_delete_favorite_handler_other_session() {
        let pool = setup_test_db();
        let owner = repo::create_session(&pool, None).await.unwrap();
        let stranger = repo::create_session(&pool, None).await.unwrap();
        let (_, Json(created)) = create_favorite_handler(
            State(pool.clone()),
            Extension(owner.clone()),
            json_body(payload("2024-11-01")),
        ).await.unwrap();

        let result = delete_favorite_handler(
            State(pool.clone()),
            Extension(stranger),
            Path(created.favorite.get_id()),
        ).await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
        assert_eq!(repo::list_favorites(&pool, &owner.owner()).unwrap().len(), 1);
    }
}
