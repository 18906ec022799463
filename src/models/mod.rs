/// Data models module
///
/// This module defines the records persisted by the application and the
/// helpers for creating them. Each model maps to one database table.

mod json_value;
pub use json_value::JsonValue;

mod user;
pub use user::{GoogleProfile, User};

mod session;
pub use session::{Owner, Session};

mod favorite;
pub use favorite::{Favorite, FavoriteFields};

mod feedback;
pub use feedback::Feedback;
