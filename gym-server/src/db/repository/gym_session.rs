//! Gym Session Repository
//!
//! `current_bookings` / `available_spots` are never stored; every read derives
//! them from the occupying (confirmed + completed) bookings.

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{BookingStatus, GymSession, GymSessionCreate, SessionDeleteResult};
use sqlx::SqlitePool;

/// SQL list of the statuses that hold a place, from [`BookingStatus::is_occupying`]
///
/// The capacity trigger in the migrations carries the same list.
pub(crate) fn occupying_sql() -> String {
    let statuses: Vec<String> = BookingStatus::ALL
        .iter()
        .filter(|s| s.is_occupying())
        .map(|s| format!("'{}'", s.as_str()))
        .collect();
    format!("({})", statuses.join(", "))
}

fn session_select() -> String {
    let occupying = occupying_sql();
    format!(
        "SELECT s.id, s.date, s.start_time, s.end_time, s.capacity, s.session_type, s.instructor, \
         s.description, s.difficulty, s.price, s.is_active, \
         COALESCE(c.n, 0) AS current_bookings, s.capacity - COALESCE(c.n, 0) AS available_spots, \
         s.created_at, s.updated_at \
         FROM gym_sessions s \
         LEFT JOIN (SELECT session_id, COUNT(*) AS n FROM bookings WHERE status IN {occupying} GROUP BY session_id) c \
         ON c.session_id = s.id"
    )
}

fn not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::SessionNotFound, format!("Session {id} not found"))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<GymSession>> {
    let sql = format!("{} WHERE s.id = ?", session_select());
    let row = sqlx::query_as::<_, GymSession>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Active sessions ordered by date then start time
///
/// `hide_full` drops sessions with no spots left (student listing).
pub async fn list_active(
    pool: &SqlitePool,
    date: Option<&str>,
    hide_full: bool,
) -> RepoResult<Vec<GymSession>> {
    let sql = format!(
        "{} WHERE s.is_active = 1 AND (?1 IS NULL OR s.date = ?1) \
         AND (?2 = 0 OR COALESCE(c.n, 0) < s.capacity) \
         ORDER BY s.date ASC, s.start_time ASC",
        session_select()
    );
    let rows = sqlx::query_as::<_, GymSession>(&sql)
        .bind(date)
        .bind(hide_full)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Insert an already validated session
pub async fn create(pool: &SqlitePool, data: &GymSessionCreate) -> RepoResult<GymSession> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO gym_sessions (id, date, start_time, end_time, capacity, session_type, instructor, description, difficulty, price, is_active, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 1, ?11, ?11)",
    )
    .bind(id)
    .bind(&data.date)
    .bind(&data.start_time)
    .bind(&data.end_time)
    .bind(data.capacity)
    .bind(&data.session_type)
    .bind(&data.instructor)
    .bind(&data.description)
    .bind(&data.difficulty)
    .bind(data.price)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create session".into()))
}

/// Overwrite an active session with merged, validated fields
///
/// The capacity guard sits in the UPDATE itself, so a concurrent booking can
/// never leave the session over capacity.
pub async fn update(pool: &SqlitePool, id: i64, data: &GymSessionCreate) -> RepoResult<GymSession> {
    let now = shared::util::now_millis();
    let occupying = occupying_sql();
    let sql = format!(
        "UPDATE gym_sessions SET date = ?1, start_time = ?2, end_time = ?3, capacity = ?4, session_type = ?5, \
         instructor = ?6, description = ?7, difficulty = ?8, price = ?9, updated_at = ?10 \
         WHERE id = ?11 AND is_active = 1 \
         AND ?4 >= (SELECT COUNT(*) FROM bookings WHERE session_id = ?11 AND status IN {occupying})"
    );
    let rows = sqlx::query(&sql)
        .bind(&data.date)
        .bind(&data.start_time)
        .bind(&data.end_time)
        .bind(data.capacity)
        .bind(&data.session_type)
        .bind(&data.instructor)
        .bind(&data.description)
        .bind(&data.difficulty)
        .bind(data.price)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;

    if rows.rows_affected() == 0 {
        return match find_by_id(pool, id).await? {
            Some(s) if s.is_active => Err(RepoError::Business(
                ErrorCode::CapacityBelowBookings,
                format!(
                    "Capacity {} is below the {} existing bookings",
                    data.capacity, s.current_bookings
                ),
            )),
            _ => Err(not_found(id)),
        };
    }

    find_by_id(pool, id).await?.ok_or_else(|| not_found(id))
}

/// Soft-delete a session and cancel its confirmed bookings
///
/// Deleting an inactive session succeeds with zero cancellations.
pub async fn soft_delete(pool: &SqlitePool, id: i64) -> RepoResult<SessionDeleteResult> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let deactivated = sqlx::query(
        "UPDATE gym_sessions SET is_active = 0, updated_at = ?1 WHERE id = ?2 AND is_active = 1",
    )
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if deactivated.rows_affected() == 0 {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM gym_sessions WHERE id = ?)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(not_found(id));
        }
        tx.commit().await?;
        return Ok(SessionDeleteResult {
            session_id: id,
            cancelled_bookings: 0,
        });
    }

    let cancelled = sqlx::query(
        "UPDATE bookings SET status = 'cancelled', cancelled_at = ?1, updated_at = ?1 \
         WHERE session_id = ?2 AND status = 'confirmed'",
    )
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(SessionDeleteResult {
        session_id: id,
        cancelled_bookings: cancelled.rows_affected(),
    })
}
