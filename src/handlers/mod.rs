/// Web API Handlers
///
/// This module contains the handlers for the JSON API endpoints.
/// Each handler is responsible for processing a specific type of HTTP request,
/// extracting the necessary data, calling the appropriate repository functions,
/// and returning a properly formatted response.

mod auth_handlers;
mod restaurant_handlers;
mod rating_handlers;
mod ranking_handlers;
mod admin_handlers;

// Re-export all handlers
pub use auth_handlers::*;
pub use restaurant_handlers::*;
pub use rating_handlers::*;
pub use ranking_handlers::*;
pub use admin_handlers::*;
