use crate::auth::{self, GENERATED_PASSWORD_LENGTH};
use crate::db::{with_retry, DbPool};
use crate::models::{GoogleProfile, User};
use crate::schema::users;
use crate::validation::normalize_email;
use anyhow::{anyhow, Result};
use chrono::Utc;
use diesel::prelude::*;
use tracing::{debug, info, instrument};

/// Creates a new user with a password
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `name` - The display name
/// * `email` - The email address, stored normalized; must not already be registered
/// * `password` - The plain-text password, hashed before storage
///
/// ### Returns
///
/// A Result containing the newly created User if successful
///
/// ### Errors
///
/// Returns an error if:
/// - Hashing the password fails
/// - Unable to get a connection from the pool
/// - The insert fails, including when the email is already taken
#[instrument(skip(pool, password), fields(email = %email))]
pub async fn create_user(pool: &DbPool, name: String, email: String, password: &str) -> Result<User> {
    debug!("Creating new user");

    let password_hash = auth::hash_password_blocking(password.to_string()).await?;
    let new_user = User::new(name, normalize_email(&email), password_hash);

    let conn = &mut pool.get()?;
    with_retry(conn, |conn| {
        diesel::insert_into(users::table)
            .values(&new_user)
            .execute(conn)
    }).await?;

    info!("Successfully created user with id: {}", new_user.get_id());
    Ok(new_user)
}

/// Retrieves a user by ID
#[instrument(skip(pool), fields(user_id = %id))]
pub fn get_user(pool: &DbPool, id: &str) -> Result<Option<User>> {
    let conn = &mut pool.get()?;
    let user = users::table
        .find(id)
        .first::<User>(conn)
        .optional()?;
    Ok(user)
}

/// Retrieves a user by email address, ignoring case and surrounding whitespace
#[instrument(skip(pool), fields(email = %email))]
pub fn find_user_by_email(pool: &DbPool, email: &str) -> Result<Option<User>> {
    let conn = &mut pool.get()?;
    let user = users::table
        .filter(users::email.eq(normalize_email(email)))
        .first::<User>(conn)
        .optional()?;
    Ok(user)
}

/// Retrieves a user by linked Google account
#[instrument(skip(pool))]
pub fn find_user_by_google_id(pool: &DbPool, google_id: &str) -> Result<Option<User>> {
    let conn = &mut pool.get()?;
    let user = users::table
        .filter(users::google_id.eq(google_id))
        .first::<User>(conn)
        .optional()?;
    Ok(user)
}

/// Checks an email and password pair
///
/// ### Returns
///
/// The matching user, or `None` when no user has that email or the
/// password does not match. Both misses run one password verification.
#[instrument(skip(pool, password), fields(email = %email))]
pub async fn verify_credentials(pool: &DbPool, email: &str, password: &str) -> Result<Option<User>> {
    let user = find_user_by_email(pool, email)?;
    let stored_hash = user.as_ref().map(|user| user.get_password_hash().to_string());

    let verified = auth::verify_password_blocking(password.to_string(), stored_hash).await?;
    match user {
        Some(user) if verified => Ok(Some(user)),
        Some(_) => {
            debug!("Password mismatch");
            Ok(None)
        }
        None => {
            debug!("No user with that email");
            Ok(None)
        }
    }
}

/// Finds or creates the local account for a Google identity
///
/// Resolution order:
/// 1. A user already linked to `profile.google_id` gets its avatar refreshed.
/// 2. A user with the same email is linked to the Google account.
/// 3. Otherwise a new user is created with a random password, so the
///    account can only be used through Google until a password is set.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `profile` - The identity returned by Google
///
/// ### Returns
///
/// The linked user as stored after the update
#[instrument(skip(pool, profile), fields(google_id = %profile.google_id, email = %profile.email))]
pub async fn link_google_account(pool: &DbPool, profile: &GoogleProfile) -> Result<User> {
    if let Some(user) = find_user_by_google_id(pool, &profile.google_id)? {
        debug!("Google account already linked, refreshing avatar");
        let conn = &mut pool.get()?;
        with_retry(conn, |conn| {
            diesel::update(users::table.find(user.get_id()))
                .set((
                    users::avatar.eq(&profile.avatar),
                    users::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)
        }).await?;
        return reload(pool, &user.get_id());
    }

    if let Some(user) = find_user_by_email(pool, &profile.email)? {
        info!("Linking Google account to existing user {}", user.get_id());
        let conn = &mut pool.get()?;
        with_retry(conn, |conn| {
            diesel::update(users::table.find(user.get_id()))
                .set((
                    users::google_id.eq(&profile.google_id),
                    users::avatar.eq(&profile.avatar),
                    users::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)
        }).await?;
        return reload(pool, &user.get_id());
    }

    let password_hash = auth::hash_password_blocking(auth::random_password(GENERATED_PASSWORD_LENGTH)).await?;
    let new_user = User::new_from_google(profile, password_hash);

    let conn = &mut pool.get()?;
    with_retry(conn, |conn| {
        diesel::insert_into(users::table)
            .values(&new_user)
            .execute(conn)
    }).await?;

    info!("Created user {} from Google account", new_user.get_id());
    Ok(new_user)
}

fn reload(pool: &DbPool, id: &str) -> Result<User> {
    get_user(pool, id)?.ok_or_else(|| anyhow!("User {} disappeared during update", id))
}
