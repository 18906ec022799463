use crate::db::{with_retry, DbPool};
use crate::models::{Favorite, FavoriteFields, Owner};
use crate::schema::{favorites, sessions};
use anyhow::Result;
use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};
use tracing::{debug, info, instrument};

/// Selects the favorites visible to an identity
///
/// A user sees every favorite carrying their user ID, whichever session it was
/// created in. A guest sees only the anonymous favorites of their own session.
fn scoped(owner: &Owner) -> favorites::BoxedQuery<'static, Sqlite> {
    match owner {
        Owner::User(user_id) => favorites::table
            .filter(favorites::user_id.eq(user_id.clone()))
            .into_boxed(),
        Owner::Guest(session_id) => favorites::table
            .filter(favorites::session_id.eq(session_id.clone()))
            .filter(favorites::user_id.is_null())
            .into_boxed(),
    }
}

/// Looks up a favorite by item within an identity's scope
fn find_by_item(
    conn: &mut SqliteConnection,
    owner: &Owner,
    item_type: &str,
    item_id: &str,
) -> QueryResult<Option<Favorite>> {
    scoped(owner)
        .filter(favorites::item_type.eq(item_type.to_string()))
        .filter(favorites::item_id.eq(item_id.to_string()))
        .first::<Favorite>(conn)
        .optional()
}

/// Retrieves a favorite by ID, if it is within the identity's scope
#[instrument(skip(pool), fields(favorite_id = %id))]
pub fn get_favorite(pool: &DbPool, owner: &Owner, id: &str) -> Result<Option<Favorite>> {
    let conn = &mut pool.get()?;
    let favorite = scoped(owner)
        .filter(favorites::id.eq(id.to_string()))
        .first::<Favorite>(conn)
        .optional()?;
    Ok(favorite)
}

/// Saves an item as a favorite unless the identity already has it
///
/// The existence check and the insert run in one immediate transaction, so
/// two concurrent requests for the same item cannot both insert.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `owner` - The identity the favorite belongs to
/// * `session_id` - The session the request arrived on
/// * `item` - The item details
///
/// ### Returns
///
/// The favorite, and `true` if it was created by this call or `false` if an
/// existing one was returned
#[instrument(skip(pool, item), fields(item_type = %item.item_type, item_id = %item.item_id))]
pub async fn create_favorite(
    pool: &DbPool,
    owner: &Owner,
    session_id: &str,
    item: FavoriteFields,
) -> Result<(Favorite, bool)> {
    let new_favorite = Favorite::new(owner, session_id.to_string(), item);

    let conn = &mut pool.get()?;
    let result = with_retry(conn, |conn| {
        conn.immediate_transaction(|conn| {
            let existing = find_by_item(
                conn,
                owner,
                &new_favorite.get_item_type(),
                &new_favorite.get_item_id(),
            )?;

            if let Some(existing) = existing {
                return Ok((existing, false));
            }

            diesel::insert_into(favorites::table)
                .values(&new_favorite)
                .execute(conn)?;
            Ok((new_favorite.clone(), true))
        })
    }).await?;

    if result.1 {
        info!("Added favorite {}", result.0.get_id());
    } else {
        debug!("Item already in favorites");
    }
    Ok(result)
}

/// Lists an identity's favorites, newest first
#[instrument(skip(pool))]
pub fn list_favorites(pool: &DbPool, owner: &Owner) -> Result<Vec<Favorite>> {
    let conn = &mut pool.get()?;
    let result = scoped(owner)
        .order(favorites::created_at.desc())
        .load::<Favorite>(conn)?;

    debug!("Retrieved {} favorites", result.len());
    Ok(result)
}

/// Deletes a favorite within the identity's scope
///
/// ### Returns
///
/// `true` if the favorite existed in scope and was deleted, `false` if it
/// does not exist or belongs to someone else
#[instrument(skip(pool), fields(favorite_id = %id))]
pub async fn delete_favorite(pool: &DbPool, owner: &Owner, id: &str) -> Result<bool> {
    if get_favorite(pool, owner, id)?.is_none() {
        debug!("Favorite not in scope");
        return Ok(false);
    }

    let conn = &mut pool.get()?;
    let deleted = with_retry(conn, |conn| {
        diesel::delete(favorites::table.find(id)).execute(conn)
    }).await?;

    info!("Removed favorite {}", id);
    Ok(deleted > 0)
}

/// Deletes guest favorites whose session no longer exists
///
/// Nobody can reach them once the session is gone, so they are dropped along
/// with expired sessions.
///
/// ### Returns
///
/// The number of favorites removed
#[instrument(skip(pool))]
pub async fn purge_orphaned_guest_favorites(pool: &DbPool) -> Result<usize> {
    let conn = &mut pool.get()?;
    let purged = with_retry(conn, |conn| {
        diesel::delete(
            favorites::table
                .filter(favorites::user_id.is_null())
                .filter(favorites::session_id.ne_all(sessions::table.select(sessions::id))),
        )
        .execute(conn)
    }).await?;

    if purged > 0 {
        info!("Purged {} orphaned guest favorites", purged);
    }
    Ok(purged)
}
