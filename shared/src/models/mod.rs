//! Data models
//!
//! Shared between gym-server and its clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflake ids (SQLite INTEGER PRIMARY KEY).

pub mod billing;
pub mod booking;
pub mod gym_session;
pub mod notification;
pub mod settings;
pub mod stats;
pub mod user;

// Re-exports
pub use billing::*;
pub use booking::*;
pub use gym_session::*;
pub use notification::*;
pub use settings::*;
pub use stats::*;
pub use user::*;
