use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a registered account
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    /// Unique identifier for the user (UUID v4 as string)
    id: String,

    /// Display name
    name: String,

    /// Email address, unique across users
    email: String,

    /// Argon2 PHC string; never sent to clients
    #[serde(skip_serializing, default)]
    password_hash: String,

    /// Google account subject, set once the account is linked
    google_id: Option<String>,

    /// Avatar URL, usually supplied by Google
    avatar: Option<String>,

    /// When this user was created
    created_at: NaiveDateTime,

    /// When this user was last modified
    updated_at: NaiveDateTime,
}

impl User {
    /// Creates a new user
    ///
    /// ### Arguments
    ///
    /// * `name` - The display name
    /// * `email` - The email address
    /// * `password_hash` - An already-hashed password
    ///
    /// ### Returns
    ///
    /// A new `User` with a fresh ID and no Google link
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password_hash,
            google_id: None,
            avatar: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a new user that is linked to a Google account from the start
    pub fn new_from_google(profile: &GoogleProfile, password_hash: String) -> Self {
        let email = crate::validation::normalize_email(&profile.email);
        let mut user = Self::new(profile.name.clone(), email, password_hash);
        user.google_id = Some(profile.google_id.clone());
        user.avatar = profile.avatar.clone();
        user
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_name(&self) -> String {
        self.name.clone()
    }

    pub fn get_email(&self) -> String {
        self.email.clone()
    }

    /// Gets the stored password hash
    pub fn get_password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn get_google_id(&self) -> Option<String> {
        self.google_id.clone()
    }

    pub fn get_avatar(&self) -> Option<String> {
        self.avatar.clone()
    }

    /// Gets the user's creation timestamp as a DateTime<Utc>
    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    /// Gets the user's last modification timestamp as a DateTime<Utc>
    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }
}

/// Identity details returned by Google once the OAuth exchange has completed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleProfile {
    /// Google's stable subject identifier
    pub google_id: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}
