//! Notification Model
//!
//! A notification with no `user_id` is a broadcast. Read and dismiss state is
//! tracked per reader in `notification_receipts`, so `is_read` depends on who
//! is asking.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum NotificationType {
    #[default]
    Info,
    Success,
    Warning,
    Error,
    Announcement,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum NotificationPriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

/// Notification as seen by one reader
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Notification {
    pub id: i64,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub priority: NotificationPriority,
    pub action_url: Option<String>,
    /// Target member, `None` for broadcasts
    pub user_id: Option<i64>,
    pub created_by: Option<i64>,
    pub is_read: bool,
    pub read_at: Option<i64>,
    pub created_at: i64,
}

/// Send notification payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NotificationCreate {
    #[validate(length(max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub message: String,
    #[serde(rename = "type", default)]
    pub notification_type: NotificationType,
    #[serde(default)]
    pub priority: NotificationPriority,
    pub user_id: Option<i64>,
    #[validate(length(max = 500))]
    pub action_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnreadCount {
    pub count: i64,
}
