/// Web API Handlers
///
/// This module contains the handlers for the RESTful API endpoints.
/// Each handler is responsible for processing a specific type of HTTP request,
/// extracting the necessary data, calling the appropriate repository or NASA
/// service functions, and returning a properly formatted response.

mod auth_handlers;
mod favorite_handlers;
mod feedback_handlers;
mod nasa_handlers;

// Re-export all handlers
pub use auth_handlers::*;
pub use favorite_handlers::*;
pub use feedback_handlers::*;
pub use nasa_handlers::*;
