//! Booking API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{booking, user};
use crate::utils::time::parse_date;
use crate::utils::{AppError, AppResult, ErrorCode};

use shared::models::{
    Booking, BookingCreate, BookingDetail, BookingQuery, BookingStatus, BookingUpdate,
    UserBookingStats, UserStatus,
};

/// Book a session
///
/// Students book for themselves; admins may pass `user_id` to book for any
/// approved member.
pub async fn create(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<BookingCreate>,
) -> AppResult<Json<Booking>> {
    let target_id = match payload.user_id {
        Some(id) if id != current.id && !current.is_admin() => {
            return Err(AppError::new(ErrorCode::PermissionDenied));
        }
        Some(id) => id,
        None => current.id,
    };

    let today = state.today();
    let member = user::find_by_id(state.pool(), target_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    if member.effective_status(&today) != UserStatus::Approved {
        return Err(AppError::new(ErrorCode::MemberNotActive)
            .with_detail("status", member.effective_status(&today).as_str()));
    }

    let created = booking::create(
        state.pool(),
        target_id,
        payload.session_id,
        &today,
        state.config.gym.enforce_booking_overlap,
    )
    .await?;

    tracing::info!(
        booking_id = created.id,
        user_id = target_id,
        session_id = payload.session_id,
        booked_by = current.id,
        "Booking confirmed"
    );
    Ok(Json(created))
}

/// Current user's bookings with session info
pub async fn list_own(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<Vec<BookingDetail>>> {
    let bookings = booking::list_for_user(state.pool(), current.id).await?;
    Ok(Json(bookings))
}

/// Current user's booking counters
pub async fn stats(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<UserBookingStats>> {
    let stats = booking::user_stats(state.pool(), current.id).await?;
    Ok(Json(stats))
}

/// Update a booking
///
/// Owners may only cancel. Admins may also record attendance, status
/// transitions and feedback.
pub async fn update(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<BookingUpdate>,
) -> AppResult<Json<Booking>> {
    payload.validate()?;
    let existing = booking::find_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound))?;

    if current.is_admin() {
        let updated = booking::admin_update(state.pool(), id, payload).await?;
        tracing::info!(booking_id = id, status = updated.status.as_str(), admin_id = current.id, "Booking updated");
        return Ok(Json(updated));
    }

    if existing.user_id != current.id {
        crate::security_log!("WARN", "booking_access_denied", user_id = current.id, booking_id = id);
        return Err(AppError::new(ErrorCode::PermissionDenied));
    }
    if payload.status != Some(BookingStatus::Cancelled) || payload.has_admin_fields() {
        return Err(AppError::with_message(
            ErrorCode::PermissionDenied,
            "Members can only cancel their bookings",
        ));
    }

    let cancelled = booking::cancel(state.pool(), id).await?;
    tracing::info!(booking_id = id, user_id = current.id, "Booking cancelled");
    Ok(Json(cancelled))
}

/// Admin booking list filtered by status, date and member
pub async fn list_admin(
    State(state): State<ServerState>,
    Query(query): Query<BookingQuery>,
) -> AppResult<Json<Vec<BookingDetail>>> {
    if let Some(date) = query.date.as_deref() {
        parse_date(date)?;
    }
    let bookings = booking::list_admin(state.pool(), &query).await?;
    Ok(Json(bookings))
}
