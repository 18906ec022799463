use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use axum_extra::extract::{cookie::CookieJar, WithRejection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::db::DbPool;
use crate::dto::{AuthResponse, LoginDto, MeResponse, MessageResponse, RegisterDto};
use crate::errors::{ApiError, FieldErrors};
use crate::models::Session;
use crate::session;
use crate::{repo, AppState};

const EMAIL_TAKEN: &str = "The email has already been taken.";
const BAD_CREDENTIALS: &str = "The provided credentials are incorrect.";

fn email_taken() -> ApiError {
    ApiError::Validation(FieldErrors::single("email", EMAIL_TAKEN))
}

fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<DieselError>(),
        Some(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _))
    )
}

/// Handler for registering a new account
///
/// This function handles POST requests to `/register`.
///
/// ### Arguments
///
/// * `state` - The application state
/// * `current` - The session the request arrived on
/// * `payload` - The registration form
///
/// ### Returns
///
/// 201 with the new user. The caller is logged in: the session is rotated
/// and the new token is set as a cookie.
#[instrument(skip(state, current, payload))]
pub async fn register_handler(
    State(state): State<AppState>,
    Extension(current): Extension<Session>,
    WithRejection(Json(payload), _): WithRejection<Json<RegisterDto>, ApiError>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), ApiError> {
    let registration = payload.validate()?;

    if repo::find_user_by_email(&state.pool, &registration.email)?.is_some() {
        return Err(email_taken());
    }

    // A concurrent registration can still win the race to the unique index
    let user = repo::create_user(&state.pool, registration.name, registration.email, &registration.password)
        .await
        .map_err(|e| if is_unique_violation(&e) { email_taken() } else { ApiError::Database(e) })?;

    let (_, jar) = session::rotate(&state, &current, Some(user.get_id())).await?;
    info!(user_id = %user.get_id(), "Registered new user");

    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            message: "Registration successful".to_string(),
            user,
        }),
    ))
}

/// Handler for logging in with email and password
///
/// This function handles POST requests to `/login`.
///
/// ### Returns
///
/// The logged-in user, with a rotated session cookie. Unknown emails and
/// wrong passwords are reported identically, against the `email` field.
#[instrument(skip(state, current, payload))]
pub async fn login_handler(
    State(state): State<AppState>,
    Extension(current): Extension<Session>,
    WithRejection(Json(payload), _): WithRejection<Json<LoginDto>, ApiError>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let credentials = payload.validate()?;

    let Some(user) = repo::verify_credentials(&state.pool, &credentials.email, &credentials.password).await? else {
        info!("Rejected login attempt");
        return Err(ApiError::Validation(FieldErrors::single("email", BAD_CREDENTIALS)));
    };

    let (_, jar) = session::rotate(&state, &current, Some(user.get_id())).await?;
    info!(user_id = %user.get_id(), "User logged in");

    Ok((
        jar,
        Json(AuthResponse {
            message: "Login successful".to_string(),
            user,
        }),
    ))
}

/// Handler for logging out
///
/// This function handles POST requests to `/logout`. The current session is
/// discarded and replaced with a fresh guest session, so favorites saved
/// while logged in stay with the account.
#[instrument(skip(state, current))]
pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(current): Extension<Session>,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    let (_, jar) = session::rotate(&state, &current, None).await?;
    Ok((jar, Json(MessageResponse::new("Logout successful"))))
}

/// Handler for fetching the logged-in user
///
/// This function handles GET requests to `/auth/me`.
///
/// ### Returns
///
/// `{"user": ...}`, with `null` for guests
#[instrument(skip(pool, current))]
pub async fn me_handler(
    State(pool): State<Arc<DbPool>>,
    Extension(current): Extension<Session>,
) -> Result<Json<MeResponse>, ApiError> {
    let user = match current.get_user_id() {
        Some(user_id) => repo::get_user(&pool, &user_id)?,
        None => None,
    };
    Ok(Json(MeResponse { user }))
}
