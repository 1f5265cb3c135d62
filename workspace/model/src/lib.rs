//! Persistence model for the recipe API: SeaORM entities, the user account
//! manager and API token handling.

pub mod accounts;
pub mod entities;
pub mod tokens;

// Re-export tracing for use in this crate
pub use tracing;
