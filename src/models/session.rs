use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A browser session, either anonymous (guest) or bound to a user
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Session {
    /// Session token, also the cookie value
    id: String,

    /// The logged-in user, if any
    user_id: Option<String>,

    created_at: NaiveDateTime,

    /// Last request seen on this session
    last_seen_at: NaiveDateTime,
}

/// The identity that favorites are scoped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    /// An authenticated user, identified by user ID
    User(String),
    /// A guest, identified by session ID
    Guest(String),
}

impl Session {
    /// Creates a new session, optionally bound to a user
    pub fn new(user_id: Option<String>) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            created_at: now,
            last_seen_at: now,
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_user_id(&self) -> Option<String> {
        self.user_id.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// Returns the identity scope for this session
    pub fn owner(&self) -> Owner {
        match &self.user_id {
            Some(user_id) => Owner::User(user_id.clone()),
            None => Owner::Guest(self.id.clone()),
        }
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    pub fn get_last_seen_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.last_seen_at, Utc)
    }

    /// Records activity on the session at `now`
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_seen_at = now.naive_utc();
    }

    /// Whether the session has been idle longer than `lifetime` at `now`
    pub fn is_expired(&self, lifetime: Duration, now: DateTime<Utc>) -> bool {
        self.get_last_seen_at()
            .checked_add_signed(lifetime)
            .is_some_and(|deadline| deadline < now)
    }
}
