//! Gym Session API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{booking, gym_session};
use crate::schedule::validate_capacity;
use crate::utils::time::parse_date;
use crate::utils::{AppError, AppResult, ErrorCode};

use shared::models::{
    BookingDetail, GymSession, GymSessionCreate, GymSessionUpdate, SessionDeleteResult,
    SessionQuery,
};

fn not_found() -> AppError {
    AppError::new(ErrorCode::SessionNotFound)
}

/// Window, duration and capacity checks shared by create and update
async fn validate_slot(state: &ServerState, data: &GymSessionCreate) -> AppResult<()> {
    data.validate()?;
    let gym = &state.config.gym;
    gym.schedule
        .validate_slot(&data.date, &data.start_time, &data.end_time)?;

    let settings = state.settings().await?;
    let max = gym.max_capacity.min(settings.max_session_capacity);
    validate_capacity(data.capacity, max)
}

/// List active sessions
///
/// Students do not see full sessions unless `show_all=true`.
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<SessionQuery>,
) -> AppResult<Json<Vec<GymSession>>> {
    if let Some(date) = query.date.as_deref() {
        parse_date(date)?;
    }
    let hide_full = !user.is_admin() && !query.show_all.unwrap_or(false);
    let sessions = gym_session::list_active(state.pool(), query.date.as_deref(), hide_full).await?;
    Ok(Json(sessions))
}

/// Get session by id (inactive sessions are admin-only)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<GymSession>> {
    let session = gym_session::find_by_id(state.pool(), id)
        .await?
        .filter(|s| s.is_active || user.is_admin())
        .ok_or_else(not_found)?;
    Ok(Json(session))
}

/// Create a session
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<GymSessionCreate>,
) -> AppResult<Json<GymSession>> {
    validate_slot(&state, &payload).await?;
    let session = gym_session::create(state.pool(), &payload).await?;
    tracing::info!(
        session_id = session.id,
        date = %session.date,
        start = %session.start_time,
        capacity = session.capacity,
        "Session created"
    );
    Ok(Json(session))
}

/// Update a session
///
/// The patch is merged over the stored row and the result is validated as a
/// whole. Lowering capacity below the occupying count is rejected atomically.
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<GymSessionUpdate>,
) -> AppResult<Json<GymSession>> {
    payload.validate()?;
    let current = gym_session::find_by_id(state.pool(), id)
        .await?
        .filter(|s| s.is_active)
        .ok_or_else(not_found)?;

    let merged = GymSessionCreate {
        date: payload.date.unwrap_or(current.date),
        start_time: payload.start_time.unwrap_or(current.start_time),
        end_time: payload.end_time.unwrap_or(current.end_time),
        capacity: payload.capacity.unwrap_or(current.capacity),
        session_type: payload.session_type.unwrap_or(current.session_type),
        instructor: payload.instructor.or(current.instructor),
        description: payload.description.or(current.description),
        difficulty: payload.difficulty.or(current.difficulty),
        price: payload.price.or(current.price),
    };
    validate_slot(&state, &merged).await?;

    let session = gym_session::update(state.pool(), id, &merged).await?;
    Ok(Json(session))
}

/// Soft-delete a session and cancel its confirmed bookings
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<SessionDeleteResult>> {
    let result = gym_session::soft_delete(state.pool(), id).await?;
    tracing::info!(
        session_id = id,
        cancelled_bookings = result.cancelled_bookings,
        "Session deleted"
    );
    Ok(Json(result))
}

/// All bookings of one session
pub async fn roster(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<BookingDetail>>> {
    gym_session::find_by_id(state.pool(), id)
        .await?
        .ok_or_else(not_found)?;
    let bookings = booking::list_for_session(state.pool(), id).await?;
    Ok(Json(bookings))
}
