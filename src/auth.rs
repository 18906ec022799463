//! Password hashing for user accounts.

use std::sync::LazyLock;

use anyhow::{anyhow, Result};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::distr::Alphanumeric;
use rand::Rng;

/// Length of the random password given to accounts created through Google
pub const GENERATED_PASSWORD_LENGTH: usize = 24;

/// Hash checked when no account matches, so the miss costs one verification
static UNKNOWN_ACCOUNT_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password(&random_password(GENERATED_PASSWORD_LENGTH)).unwrap_or_default());

/// Hashes a password into an argon2id PHC string
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

/// Checks a password against a stored PHC string
///
/// A stored value that does not parse as a PHC string never matches.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Hashes a password on the blocking thread pool
pub async fn hash_password_blocking(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password)).await?
}

/// Checks a password on the blocking thread pool
///
/// With no stored hash the password is still checked against a throwaway
/// hash and the result is always `false`, so an unknown account takes as
/// long to reject as a wrong password.
pub async fn verify_password_blocking(password: String, password_hash: Option<String>) -> Result<bool> {
    let verified = tokio::task::spawn_blocking(move || match password_hash {
        Some(hash) => verify_password(&password, &hash),
        None => {
            verify_password(&password, &UNKNOWN_ACCOUNT_HASH);
            false
        }
    })
    .await?;
    Ok(verified)
}

/// Generates a random alphanumeric password
pub fn random_password(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
