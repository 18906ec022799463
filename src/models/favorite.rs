use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{JsonValue, Owner};

/// A gallery item saved by a user or a guest session
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::favorites)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Favorite {
    /// Unique identifier for the favorite (UUID v4 as string)
    id: String,

    /// Owning user; `None` for guest favorites
    user_id: Option<String>,

    /// Session the favorite was created in
    session_id: String,

    /// Source of the item, e.g. "apod", "mars", "epic"
    item_type: String,

    /// Identifier of the item within its source
    item_id: String,

    title: String,

    image_url: Option<String>,

    description: Option<String>,

    /// Arbitrary client-supplied details about the item
    metadata: Option<JsonValue>,

    /// When this favorite was created
    created_at: NaiveDateTime,
}

/// Client-supplied fields of a new favorite
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoriteFields {
    pub item_type: String,
    pub item_id: String,
    pub title: String,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl Favorite {
    /// Creates a new favorite
    ///
    /// ### Arguments
    ///
    /// * `owner` - The identity the favorite belongs to
    /// * `session_id` - The session the favorite is being created in
    /// * `fields` - The item details
    ///
    /// ### Returns
    ///
    /// A new `Favorite`; `user_id` is set only when `owner` is a user
    pub fn new(owner: &Owner, session_id: String, fields: FavoriteFields) -> Self {
        let user_id = match owner {
            Owner::User(id) => Some(id.clone()),
            Owner::Guest(_) => None,
        };
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            session_id,
            item_type: fields.item_type,
            item_id: fields.item_id,
            title: fields.title,
            image_url: fields.image_url,
            description: fields.description,
            metadata: fields.metadata.map(JsonValue),
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_user_id(&self) -> Option<String> {
        self.user_id.clone()
    }

    pub fn get_session_id(&self) -> String {
        self.session_id.clone()
    }

    pub fn get_item_type(&self) -> String {
        self.item_type.clone()
    }

    pub fn get_item_id(&self) -> String {
        self.item_id.clone()
    }

    pub fn get_title(&self) -> String {
        self.title.clone()
    }

    pub fn get_image_url(&self) -> Option<String> {
        self.image_url.clone()
    }

    pub fn get_description(&self) -> Option<String> {
        self.description.clone()
    }

    pub fn get_metadata(&self) -> Option<serde_json::Value> {
        self.metadata.as_ref().map(|m| m.0.clone())
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}
