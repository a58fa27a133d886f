/// Repository module
///
/// This module provides the data access layer for the application.
/// It contains functions for interacting with the database: users,
/// restaurants, ratings and the per-restaurant rating aggregates.
///
/// Every write that touches more than one table runs inside a single
/// transaction, so a failed step leaves no partial rows behind.

mod user_repo;
mod restaurant_repo;
mod rating_repo;
mod aggregate_repo;

// Re-export all repository functions
pub use user_repo::*;
pub use restaurant_repo::*;
pub use rating_repo::*;
pub use aggregate_repo::*;
