//! Shared types for the marketplace server
//!
//! Common types used across the workspace: document models, status enums,
//! error types and the unified API response envelope.

pub mod error;
pub mod models;
pub mod response;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult};
pub use response::ApiResponse;
