use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ApiError, FieldErrors};
use crate::models::{FavoriteFields, Feedback, Favorite, User};
use crate::nasa::Rover;
use crate::validation::{self, MAX_STRING_LENGTH};

/// Longest accepted favorite item type
pub const MAX_ITEM_TYPE_LENGTH: usize = 50;

/// Longest accepted feedback message
pub const MAX_MESSAGE_LENGTH: usize = 5000;

/// Shortest accepted password
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Number of APOD entries returned when no count is given
pub const DEFAULT_APOD_COUNT: u32 = 5;

/// Largest APOD count a client may request
pub const MAX_APOD_COUNT: u32 = 100;

/// Martian day used when no sol is given
pub const DEFAULT_SOL: u32 = 1000;

/// Days after today the NEO window ends when no end date is given
pub const NEO_WINDOW_DAYS: u64 = 7;

/// Rating given to feedback that does not specify one
pub const DEFAULT_RATING: i64 = 5;

/// Data transfer object for registering an account
///
/// Every field is optional at the deserialization stage so that missing
/// fields are reported as validation errors rather than a parse failure.
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct RegisterDto {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

/// A registration that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterDto {
    /// Checks the registration form
    ///
    /// Email uniqueness needs the database and is checked by the handler.
    pub fn validate(self) -> Result<Registration, ApiError> {
        let mut errors = FieldErrors::new();

        if validation::required(&mut errors, "name", self.name.as_deref()) {
            validation::max_length(&mut errors, "name", self.name.as_deref().unwrap_or_default(), MAX_STRING_LENGTH);
        }

        let email = self.email.as_deref().map(validation::normalize_email);
        if validation::required(&mut errors, "email", email.as_deref()) {
            let email = email.as_deref().unwrap_or_default();
            if validation::email(&mut errors, "email", email) {
                validation::max_length(&mut errors, "email", email, MAX_STRING_LENGTH);
            }
        }

        if validation::required(&mut errors, "password", self.password.as_deref()) {
            let password = self.password.as_deref().unwrap_or_default();
            if validation::min_length(&mut errors, "password", password, MIN_PASSWORD_LENGTH)
                && self.password_confirmation.as_deref() != Some(password)
            {
                errors.add("password", "The password confirmation does not match.");
            }
        }

        errors.into_result()?;

        Ok(Registration {
            name: self.name.unwrap_or_default(),
            email: email.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
        })
    }
}

/// Data transfer object for logging in
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct LoginDto {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login credentials that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl LoginDto {
    pub fn validate(self) -> Result<Credentials, ApiError> {
        let mut errors = FieldErrors::new();

        let email = self.email.as_deref().map(validation::normalize_email);
        if validation::required(&mut errors, "email", email.as_deref()) {
            validation::email(&mut errors, "email", email.as_deref().unwrap_or_default());
        }
        validation::required(&mut errors, "password", self.password.as_deref());

        errors.into_result()?;

        Ok(Credentials {
            email: email.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
        })
    }
}

/// Data transfer object for saving a favorite
///
/// `metadata` may be any JSON value, or a string holding encoded JSON which
/// is decoded before storage.
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct CreateFavoriteDto {
    pub item_type: Option<String>,
    pub item_id: Option<String>,
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub metadata: Option<Value>,
}

impl CreateFavoriteDto {
    pub fn validate(self) -> Result<FavoriteFields, ApiError> {
        let mut errors = FieldErrors::new();

        if validation::required(&mut errors, "item_type", self.item_type.as_deref()) {
            validation::max_length(&mut errors, "item_type", self.item_type.as_deref().unwrap_or_default(), MAX_ITEM_TYPE_LENGTH);
        }
        if validation::required(&mut errors, "item_id", self.item_id.as_deref()) {
            validation::max_length(&mut errors, "item_id", self.item_id.as_deref().unwrap_or_default(), MAX_STRING_LENGTH);
        }
        if validation::required(&mut errors, "title", self.title.as_deref()) {
            validation::max_length(&mut errors, "title", self.title.as_deref().unwrap_or_default(), MAX_STRING_LENGTH);
        }

        let metadata = match self.metadata {
            None | Some(Value::Null) => None,
            Some(Value::String(encoded)) => match serde_json::from_str::<Value>(&encoded) {
                Ok(decoded) => Some(decoded),
                Err(_) => {
                    errors.add("metadata", "The metadata must be a valid JSON string.");
                    None
                }
            },
            Some(value) => Some(value),
        };

        errors.into_result()?;

        Ok(FavoriteFields {
            item_type: self.item_type.unwrap_or_default(),
            item_id: self.item_id.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            image_url: self.image_url,
            description: self.description,
            metadata,
        })
    }
}

/// Data transfer object for leaving feedback
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct CreateFeedbackDto {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
    pub rating: Option<i64>,
}

/// Feedback that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeedback {
    pub name: String,
    pub email: String,
    pub message: String,
    pub rating: i32,
}

impl CreateFeedbackDto {
    pub fn validate(self) -> Result<NewFeedback, ApiError> {
        let mut errors = FieldErrors::new();

        if validation::required(&mut errors, "name", self.name.as_deref()) {
            validation::max_length(&mut errors, "name", self.name.as_deref().unwrap_or_default(), MAX_STRING_LENGTH);
        }
        if validation::required(&mut errors, "email", self.email.as_deref()) {
            let email = self.email.as_deref().unwrap_or_default();
            if validation::email(&mut errors, "email", email) {
                validation::max_length(&mut errors, "email", email, MAX_STRING_LENGTH);
            }
        }
        if validation::required(&mut errors, "message", self.message.as_deref()) {
            validation::max_length(&mut errors, "message", self.message.as_deref().unwrap_or_default(), MAX_MESSAGE_LENGTH);
        }

        let rating = self.rating.unwrap_or(DEFAULT_RATING);
        validation::between(&mut errors, "rating", rating, 1, 5);

        errors.into_result()?;

        Ok(NewFeedback {
            name: self.name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            message: self.message.unwrap_or_default(),
            // In range after validation
            rating: rating as i32,
        })
    }
}

/// Query parameters of `GET /api/nasa/apod`
///
/// Numbers arrive as strings so that malformed values produce a validation
/// error instead of a query rejection.
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct ApodQuery {
    pub count: Option<String>,
}

impl ApodQuery {
    pub fn validate(&self) -> Result<u32, ApiError> {
        let Some(raw) = non_blank(&self.count) else {
            return Ok(DEFAULT_APOD_COUNT);
        };

        match raw.parse::<i64>() {
            Ok(count) if (1..=MAX_APOD_COUNT as i64).contains(&count) => Ok(count as u32),
            Ok(_) => Err(ApiError::Validation(FieldErrors::single(
                "count",
                format!("The count must be between 1 and {}.", MAX_APOD_COUNT),
            ))),
            Err(_) => Err(ApiError::Validation(FieldErrors::single("count", "The count must be an integer."))),
        }
    }
}

/// Query parameters of `GET /api/nasa/mars-photos`
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct MarsQuery {
    pub sol: Option<String>,
    pub rover: Option<String>,
}

impl MarsQuery {
    pub fn validate(&self) -> Result<(Rover, u32), ApiError> {
        let mut errors = FieldErrors::new();

        let sol = match non_blank(&self.sol) {
            None => DEFAULT_SOL,
            Some(raw) => raw.parse::<u32>().unwrap_or_else(|_| {
                errors.add("sol", "The sol must be a non-negative integer.");
                DEFAULT_SOL
            }),
        };

        let rover = match non_blank(&self.rover) {
            None => Rover::default(),
            Some(raw) => Rover::parse(raw).unwrap_or_else(|| {
                let names: Vec<&str> = Rover::ALL.iter().map(|r| r.as_str()).collect();
                errors.add("rover", format!("The rover must be one of: {}.", names.join(", ")));
                Rover::default()
            }),
        };

        errors.into_result()?;
        Ok((rover, sol))
    }
}

/// Query parameters of `GET /api/nasa/neo`
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct NeoQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl NeoQuery {
    /// Resolves the date window
    ///
    /// Missing dates default to `today` and `today + 7` independently. The
    /// width is not capped here; the NASA API rejects wide windows and the
    /// service degrades that to an empty result.
    pub fn validate(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), ApiError> {
        let mut errors = FieldErrors::new();

        let start = match non_blank(&self.start_date) {
            None => Some(today),
            Some(raw) => parse_date(&mut errors, "start_date", raw),
        };
        let end = match non_blank(&self.end_date) {
            None => today.checked_add_days(Days::new(NEO_WINDOW_DAYS)),
            Some(raw) => parse_date(&mut errors, "end_date", raw),
        };

        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                errors.add("end_date", "The end date must be a date after or equal to start date.");
            }
        }

        errors.into_result()?;
        match (start, end) {
            (Some(start), Some(end)) => Ok((start, end)),
            _ => Err(ApiError::Validation(FieldErrors::single("end_date", "The end date is out of range."))),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(errors: &mut FieldErrors, field: &str, raw: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(
                field,
                format!("The {} does not match the format Y-m-d.", field.replace('_', " ")),
            );
            None
        }
    }
}

/// Response carrying only a message
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Response to a successful login or registration
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthResponse {
    pub message: String,
    pub user: User,
}

/// Response of `GET /auth/me`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MeResponse {
    pub user: Option<User>,
}

/// Response to saving a favorite
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FavoriteResponse {
    pub message: String,
    pub favorite: Favorite,
}

/// Response to leaving feedback
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FeedbackResponse {
    pub message: String,
    pub feedback: Feedback,
}
