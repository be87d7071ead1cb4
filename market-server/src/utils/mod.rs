//! Utility functions

pub mod logger;
pub mod time;

pub use time::now_millis;

// Re-export the shared error types under the server's namespace
pub use shared::{AppError, AppResult, ApiResponse};
