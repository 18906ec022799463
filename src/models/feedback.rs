use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A feedback message left by a visitor
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::feedback)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Feedback {
    id: String,
    name: String,
    email: String,
    message: String,
    /// Star rating from 1 to 5
    rating: i32,
    created_at: NaiveDateTime,
}

impl Feedback {
    pub fn new(name: String, email: String, message: String, rating: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            message,
            rating,
            created_at: Utc::now().naive_utc(),
        }
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

    pub fn get_message(&self) -> String {
        self.message.clone()
    }

    pub fn get_rating(&self) -> i32 {
        self.rating
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}
