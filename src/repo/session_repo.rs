use crate::db::{with_retry, DbPool};
use crate::models::Session;
use crate::schema::sessions;
use anyhow::Result;
use chrono::{Duration, Utc};
use diesel::prelude::*;
use tracing::{debug, info, instrument};

/// Creates a new session
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `user_id` - The logged-in user, or `None` for a guest session
///
/// ### Returns
///
/// A Result containing the newly created Session if successful
#[instrument(skip(pool))]
pub async fn create_session(pool: &DbPool, user_id: Option<String>) -> Result<Session> {
    let session = Session::new(user_id);

    let conn = &mut pool.get()?;
    with_retry(conn, |conn| {
        diesel::insert_into(sessions::table)
            .values(&session)
            .execute(conn)
    }).await?;

    debug!("Created session {}", session.get_id());
    Ok(session)
}

/// Retrieves a session by ID, whether or not it has expired
pub fn get_session(pool: &DbPool, id: &str) -> Result<Option<Session>> {
    let conn = &mut pool.get()?;
    let session = sessions::table
        .find(id)
        .first::<Session>(conn)
        .optional()?;
    Ok(session)
}

/// Resolves a session ID to a live session and records activity on it
///
/// A session idle for longer than `lifetime` is deleted and treated as
/// missing.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `id` - The session ID presented by the client
/// * `lifetime` - How long a session may stay idle
///
/// ### Returns
///
/// The touched session, or `None` if it does not exist or has expired
#[instrument(skip(pool, id))]
pub async fn touch_session(pool: &DbPool, id: &str, lifetime: Duration) -> Result<Option<Session>> {
    let Some(mut session) = get_session(pool, id)? else {
        debug!("Unknown session");
        return Ok(None);
    };

    let now = Utc::now();
    if session.is_expired(lifetime, now) {
        debug!("Session expired");
        delete_session(pool, id).await?;
        return Ok(None);
    }

    session.touch(now);
    let conn = &mut pool.get()?;
    with_retry(conn, |conn| {
        diesel::update(sessions::table.find(id))
            .set(sessions::last_seen_at.eq(now.naive_utc()))
            .execute(conn)
    }).await?;

    Ok(Some(session))
}

/// Replaces a session with a fresh one
///
/// The old session row is deleted and a new one is created for `user_id`,
/// so a session token never survives a change of identity.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `old_id` - The session being replaced
/// * `user_id` - The user the new session belongs to, or `None` for a guest
#[instrument(skip(pool, old_id))]
pub async fn rotate_session(pool: &DbPool, old_id: &str, user_id: Option<String>) -> Result<Session> {
    let session = Session::new(user_id);

    let conn = &mut pool.get()?;
    with_retry(conn, |conn| {
        conn.immediate_transaction(|conn| {
            diesel::delete(sessions::table.find(old_id)).execute(conn)?;
            diesel::insert_into(sessions::table)
                .values(&session)
                .execute(conn)
        })
    }).await?;

    debug!("Rotated session to {}", session.get_id());
    Ok(session)
}

/// Deletes a session, returning whether it existed
pub async fn delete_session(pool: &DbPool, id: &str) -> Result<bool> {
    let conn = &mut pool.get()?;
    let deleted = with_retry(conn, |conn| {
        diesel::delete(sessions::table.find(id)).execute(conn)
    }).await?;
    Ok(deleted > 0)
}

/// Deletes every session idle for longer than `lifetime`
///
/// ### Returns
///
/// The number of sessions removed
#[instrument(skip(pool))]
pub async fn purge_expired_sessions(pool: &DbPool, lifetime: Duration) -> Result<usize> {
    let Some(cutoff) = Utc::now().checked_sub_signed(lifetime) else {
        return Ok(0);
    };
    let cutoff = cutoff.naive_utc();

    let conn = &mut pool.get()?;
    let purged = with_retry(conn, |conn| {
        diesel::delete(sessions::table.filter(sessions::last_seen_at.lt(cutoff)))
            .execute(conn)
    }).await?;

    if purged > 0 {
        info!("Purged {} expired sessions", purged);
    }
    Ok(purged)
}
