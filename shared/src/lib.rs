//! Shared types for the gym platform
//!
//! Common types used by the server and its clients: the error system,
//! data models, API DTOs and id/time utilities.

pub mod client;
pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::Json;
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use http;
pub use serde::{Deserialize, Serialize};
