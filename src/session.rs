//! Cookie-backed sessions.
//!
//! Every request passes through [`session_middleware`], which resolves the
//! `stargazer_session` cookie to a live [`Session`] and makes it available to
//! handlers as a request extension. Requests without a usable cookie get a
//! fresh guest session.

use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::header::SET_COOKIE,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{debug, warn};

use crate::errors::ApiError;
use crate::models::Session;
use crate::repo;
use crate::AppState;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "stargazer_session";

/// Builds the session cookie for a token
///
/// The cookie's lifetime matches the server-side idle lifetime; it is
/// re-issued on every response so an active browser keeps it.
pub fn session_cookie(session_id: String, lifetime: Duration) -> Cookie<'static> {
    let max_age = time::Duration::seconds(i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX));
    Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build()
}

/// Resolves or creates the request's session
///
/// After the handler runs, the session cookie is (re)issued unless the
/// handler already set one, which is how login and logout hand out a
/// rotated token.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let lifetime = state.config.session_lifetime();
    let idle_limit = chrono::Duration::from_std(lifetime).unwrap_or(chrono::Duration::MAX);

    let existing = match jar.get(SESSION_COOKIE) {
        Some(cookie) => repo::touch_session(&state.pool, cookie.value(), idle_limit).await?,
        None => None,
    };

    let session = match existing {
        Some(session) => session,
        None => {
            let session = repo::create_session(&state.pool, None).await?;
            debug!(session_id = %session.get_id(), "Started guest session");
            session
        }
    };

    let session_id = session.get_id();
    request.extensions_mut().insert(session);

    let mut response = next.run(request).await;

    if !sets_session_cookie(&response) {
        let cookie = session_cookie(session_id, lifetime);
        match cookie.to_string().parse() {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(err) => warn!("Failed to encode session cookie: {}", err),
        }
    }

    Ok(response)
}

fn sets_session_cookie(response: &Response) -> bool {
    let prefix = format!("{}=", SESSION_COOKIE);
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.starts_with(&prefix))
}

/// Replaces the request's session with a fresh one for `user_id`
///
/// ### Returns
///
/// The new session and a cookie jar that sets its token on the response
pub async fn rotate(
    state: &AppState,
    current: &Session,
    user_id: Option<String>,
) -> Result<(Session, CookieJar), ApiError> {
    let session = repo::rotate_session(&state.pool, &current.get_id(), user_id).await?;
    let jar = CookieJar::new().add(session_cookie(session.get_id(), state.config.session_lifetime()));
    Ok((session, jar))
}
