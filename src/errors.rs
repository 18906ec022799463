use std::collections::BTreeMap;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    response::{IntoResponse, Response},
    http::StatusCode,
    Json
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// Validation messages grouped by the request field they refer to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set containing a single message for one field
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Records a message for a field
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the messages recorded for a field
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// The first message in field order, used as the summary of the failure
    pub fn first_message(&self) -> &str {
        self.0
            .values()
            .flat_map(|messages| messages.iter())
            .next()
            .map(String::as_str)
            .unwrap_or("The given data was invalid.")
    }

    /// Converts the collected messages into a result
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self))
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
    #[error("{0}")]
    NotFound(String),
    #[error("{}", .0.first_message())]
    Validation(FieldErrors),
    /// The request could not be read at all (malformed JSON, wrong content type)
    #[error("{message}")]
    BadRequest { status: StatusCode, message: String },
    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Database(err) => {
                error!("Database error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": "Internal server error" }),
                )
            }
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({ "error": message }),
            ),
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                serde_json::json!({
                    "error": errors.first_message(),
                    "errors": errors,
                }),
            ),
            ApiError::BadRequest { status, message } => (
                status,
                serde_json::json!({ "error": message }),
            ),
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                serde_json::json!({ "error": "Method not allowed" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Splits a deserializer message of the form `path: reason` into its parts
///
/// Messages without a field path are reported against `fallback`.
fn field_error(text: &str, fallback: &str) -> FieldErrors {
    match text.split_once(": ") {
        Some((path, reason)) if !path.is_empty() && !path.contains(char::is_whitespace) => {
            FieldErrors::single(path, reason)
        }
        _ => FieldErrors::single(fallback, text),
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            // Well-formed JSON whose fields have the wrong types
            JsonRejection::JsonDataError(err) => {
                let text = err.body_text();
                let detail = text.split_once("target type: ").map_or(text.as_str(), |(_, rest)| rest);
                ApiError::Validation(field_error(detail, "body"))
            }
            other => ApiError::BadRequest {
                status: other.status(),
                message: other.body_text(),
            },
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        let text = rejection.body_text();
        let detail = text.split_once("query string: ").map_or(text.as_str(), |(_, rest)| rest);
        ApiError::Validation(field_error(detail, "query"))
    }
}
