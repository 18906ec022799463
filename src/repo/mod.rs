/// Repository module
///
/// This module provides the data access layer for the application.
/// It contains functions for interacting with the database, including
/// managing users, sessions, favorites and feedback.
///
/// Reads are plain synchronous diesel queries; writes go through
/// [`crate::db::with_retry`] so a briefly locked database does not fail the
/// request.

mod user_repo;
mod session_repo;
mod favorite_repo;
mod feedback_repo;

// Re-export all repository functions
pub use user_repo::*;
pub use session_repo::*;
pub use favorite_repo::*;
pub use feedback_repo::*;
