//! Notification API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Serialize;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::notification;
use crate::utils::validation::{MAX_MESSAGE_LEN, MAX_TITLE_LEN, validate_required_text};
use crate::utils::{ApiResponse, AppResult};

use shared::models::{Notification, NotificationCreate, UnreadCount};

/// Rows touched by a bulk read/delete
#[derive(Debug, Serialize)]
pub struct BulkResult {
    pub affected: u64,
}

/// Notifications visible to the caller (targeted + broadcast, minus dismissed)
pub async fn list_own(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Notification>>> {
    let rows = notification::list_for_user(state.pool(), current.id).await?;
    Ok(Json(rows))
}

pub async fn unread_count(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<UnreadCount>> {
    let count = notification::unread_count(state.pool(), current.id).await?;
    Ok(Json(UnreadCount { count }))
}

pub async fn mark_read(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    notification::mark_read(state.pool(), id, current.id).await?;
    Ok(Json(ApiResponse::ok()))
}

pub async fn mark_all_read(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<BulkResult>> {
    let affected = notification::mark_all_read(state.pool(), current.id).await?;
    Ok(Json(BulkResult { affected }))
}

/// Delete a targeted notification, or dismiss a broadcast for this reader only
pub async fn delete_one(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    notification::delete_for_user(state.pool(), id, current.id).await?;
    Ok(Json(ApiResponse::ok()))
}

pub async fn delete_all(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<BulkResult>> {
    let affected = notification::delete_all_for_user(state.pool(), current.id).await?;
    Ok(Json(BulkResult { affected }))
}

/// Send a notification; no `user_id` means broadcast
pub async fn create(
    State(state): State<ServerState>,
    Extension(admin): Extension<CurrentUser>,
    Json(payload): Json<NotificationCreate>,
) -> AppResult<Json<Notification>> {
    payload.validate()?;
    validate_required_text(&payload.title, "title", MAX_TITLE_LEN)?;
    validate_required_text(&payload.message, "message", MAX_MESSAGE_LEN)?;

    let created = notification::create(state.pool(), &payload, admin.id).await?;
    tracing::info!(
        notification_id = created.id,
        recipient = ?created.user_id,
        admin_id = admin.id,
        "Notification sent"
    );
    Ok(Json(created))
}

/// Every notification, broadcast or targeted
pub async fn list_all(State(state): State<ServerState>) -> AppResult<Json<Vec<Notification>>> {
    let rows = notification::list_all(state.pool()).await?;
    Ok(Json(rows))
}

/// Remove a notification for everyone
pub async fn hard_delete(
    State(state): State<ServerState>,
    Extension(admin): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    notification::hard_delete(state.pool(), id).await?;
    tracing::info!(notification_id = id, admin_id = admin.id, "Notification deleted");
    Ok(Json(ApiResponse::ok()))
}
