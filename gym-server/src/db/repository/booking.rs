//! Booking Repository
//!
//! Booking creation is one conditional `INSERT ... SELECT`: every capacity and
//! conflict check is re-evaluated by SQLite at write time. When the insert
//! lands zero rows the cause is diagnosed afterwards.

use super::gym_session::{self, occupying_sql};
use super::{RepoError, RepoResult};
use crate::schedule::overlaps;
use shared::error::ErrorCode;
use shared::models::{Booking, BookingDetail, BookingQuery, BookingStatus, BookingUpdate, UserBookingStats};
use sqlx::SqlitePool;

const BOOKING_SELECT: &str = "SELECT id, user_id, session_id, status, booking_date, check_in_time, check_out_time, notes, rating, feedback, cancelled_at, created_at, updated_at FROM bookings";

const DETAIL_SELECT: &str = "SELECT b.id, b.user_id, b.session_id, b.status, b.booking_date, b.check_in_time, b.check_out_time, \
     b.notes, b.rating, b.feedback, b.cancelled_at, b.created_at, b.updated_at, \
     s.date AS session_date, s.start_time, s.end_time, s.session_type, s.instructor, \
     u.first_name, u.last_name, u.email, u.student_id \
     FROM bookings b \
     JOIN gym_sessions s ON s.id = b.session_id \
     JOIN users u ON u.id = b.user_id";

/// Capacity trigger message (see migrations)
const CAPACITY_TRIGGER_MSG: &str = "session capacity exceeded";

fn not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::BookingNotFound, format!("Booking {id} not found"))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Booking>> {
    let sql = format!("{BOOKING_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Booking>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Book a session for a user
///
/// Guards (all inside the INSERT): session active and not in the past,
/// occupying count below capacity, no confirmed duplicate, and (when
/// `check_overlap`) no confirmed booking of the user overlapping in time on
/// the same date.
pub async fn create(
    pool: &SqlitePool,
    user_id: i64,
    session_id: i64,
    today: &str,
    check_overlap: bool,
) -> RepoResult<Booking> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let occupying = occupying_sql();
    let sql = format!(
        "INSERT INTO bookings (id, user_id, session_id, status, booking_date, created_at, updated_at) \
         SELECT ?1, ?2, s.id, 'confirmed', ?3, ?3, ?3 FROM gym_sessions s \
         WHERE s.id = ?4 AND s.is_active = 1 AND s.date >= ?5 \
         AND (SELECT COUNT(*) FROM bookings b WHERE b.session_id = s.id AND b.status IN {occupying}) < s.capacity \
         AND NOT EXISTS (SELECT 1 FROM bookings b WHERE b.session_id = s.id AND b.user_id = ?2 AND b.status = 'confirmed') \
         AND (?6 = 0 OR NOT EXISTS ( \
             SELECT 1 FROM bookings b JOIN gym_sessions o ON o.id = b.session_id \
             WHERE b.user_id = ?2 AND b.status = 'confirmed' AND o.id != s.id \
             AND o.date = s.date AND o.start_time < s.end_time AND s.start_time < o.end_time))"
    );

    let result = sqlx::query(&sql)
        .bind(id)
        .bind(user_id)
        .bind(now)
        .bind(session_id)
        .bind(today)
        .bind(check_overlap)
        .execute(pool)
        .await;

    let rows = match result {
        Ok(rows) => rows.rows_affected(),
        Err(sqlx::Error::Database(e)) if e.message().contains(CAPACITY_TRIGGER_MSG) => {
            return Err(RepoError::business(ErrorCode::SessionFullyBooked));
        }
        Err(e) => {
            return Err(match RepoError::from(e) {
                RepoError::Duplicate(_) => RepoError::business(ErrorCode::DuplicateBooking),
                other => other,
            });
        }
    };

    if rows == 0 {
        return Err(diagnose_rejected(pool, user_id, session_id, today, check_overlap).await?);
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create booking".into()))
}

/// Work out which guard stopped a zero-row booking insert
async fn diagnose_rejected(
    pool: &SqlitePool,
    user_id: i64,
    session_id: i64,
    today: &str,
    check_overlap: bool,
) -> RepoResult<RepoError> {
    let session = match gym_session::find_by_id(pool, session_id).await? {
        Some(s) if s.is_active => s,
        _ => {
            return Ok(RepoError::Business(
                ErrorCode::SessionNotFound,
                format!("Session {session_id} not found"),
            ));
        }
    };

    if session.date.as_str() < today {
        return Ok(RepoError::business(ErrorCode::SessionAlreadyPast));
    }

    let duplicate: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM bookings WHERE session_id = ? AND user_id = ? AND status = 'confirmed')",
    )
    .bind(session_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    if duplicate {
        return Ok(RepoError::business(ErrorCode::DuplicateBooking));
    }

    if check_overlap {
        let same_day: Vec<(String, String)> = sqlx::query_as(
            "SELECT o.start_time, o.end_time FROM bookings b JOIN gym_sessions o ON o.id = b.session_id \
             WHERE b.user_id = ? AND b.status = 'confirmed' AND o.id != ? AND o.date = ?",
        )
        .bind(user_id)
        .bind(session_id)
        .bind(&session.date)
        .fetch_all(pool)
        .await?;
        if same_day
            .iter()
            .any(|(start, end)| overlaps(start, end, &session.start_time, &session.end_time))
        {
            return Ok(RepoError::business(ErrorCode::BookingTimeConflict));
        }
    }

    // Remaining guard is capacity (also the outcome when a racing writer won)
    Ok(RepoError::business(ErrorCode::SessionFullyBooked))
}

fn transition_error(from: BookingStatus, to: BookingStatus) -> RepoError {
    RepoError::Business(
        ErrorCode::InvalidBookingTransition,
        format!("Cannot move a {} booking to {}", from.as_str(), to.as_str()),
    )
}

/// `confirmed -> cancelled`; cancelling a cancelled booking is a no-op
pub async fn cancel(pool: &SqlitePool, id: i64) -> RepoResult<Booking> {
    let current = find_by_id(pool, id).await?.ok_or_else(|| not_found(id))?;
    if current.status == BookingStatus::Cancelled {
        return Ok(current);
    }
    if !current.status.can_transition_to(BookingStatus::Cancelled) {
        return Err(transition_error(current.status, BookingStatus::Cancelled));
    }

    // Guarded on the status just read; a concurrent change lands zero rows
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE bookings SET status = 'cancelled', cancelled_at = ?1, updated_at = ?1 \
         WHERE id = ?2 AND status = ?3",
    )
    .bind(now)
    .bind(id)
    .bind(current.status)
    .execute(pool)
    .await?;

    let booking = find_by_id(pool, id).await?.ok_or_else(|| not_found(id))?;
    if rows.rows_affected() == 0 && booking.status != BookingStatus::Cancelled {
        return Err(transition_error(booking.status, BookingStatus::Cancelled));
    }
    Ok(booking)
}

/// Admin update: status transition plus attendance and feedback fields
///
/// Transitions follow [`BookingStatus::accepts`]: only a confirmed booking
/// changes status, and repeating the current status is a no-op.
pub async fn admin_update(pool: &SqlitePool, id: i64, data: BookingUpdate) -> RepoResult<Booking> {
    if let Some(rating) = data.rating
        && !(1..=5).contains(&rating)
    {
        return Err(RepoError::business(ErrorCode::InvalidRating));
    }

    let current = find_by_id(pool, id).await?.ok_or_else(|| not_found(id))?;
    if let Some(next) = data.status
        && !current.status.accepts(next)
    {
        return Err(transition_error(current.status, next));
    }

    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE bookings SET \
             status = COALESCE(?1, status), \
             cancelled_at = CASE WHEN ?1 = 'cancelled' AND status != 'cancelled' THEN ?2 ELSE cancelled_at END, \
             check_in_time = COALESCE(?3, check_in_time), check_out_time = COALESCE(?4, check_out_time), \
             notes = COALESCE(?5, notes), rating = COALESCE(?6, rating), feedback = COALESCE(?7, feedback), \
             updated_at = ?2 \
         WHERE id = ?8 AND status = ?9",
    )
    .bind(data.status)
    .bind(now)
    .bind(data.check_in_time)
    .bind(data.check_out_time)
    .bind(data.notes)
    .bind(data.rating)
    .bind(data.feedback)
    .bind(id)
    .bind(current.status)
    .execute(pool)
    .await?;

    let booking = find_by_id(pool, id).await?.ok_or_else(|| not_found(id))?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::InvalidBookingTransition,
            format!("Booking changed to {} meanwhile", booking.status.as_str()),
        ));
    }
    Ok(booking)
}

/// A member's bookings with session info, most recent session first
pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<BookingDetail>> {
    let sql = format!("{DETAIL_SELECT} WHERE b.user_id = ? ORDER BY s.date DESC, s.start_time DESC");
    let rows = sqlx::query_as::<_, BookingDetail>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Roster of one session
pub async fn list_for_session(pool: &SqlitePool, session_id: i64) -> RepoResult<Vec<BookingDetail>> {
    let sql = format!("{DETAIL_SELECT} WHERE b.session_id = ? ORDER BY b.created_at ASC");
    let rows = sqlx::query_as::<_, BookingDetail>(&sql)
        .bind(session_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn list_admin(pool: &SqlitePool, query: &BookingQuery) -> RepoResult<Vec<BookingDetail>> {
    let sql = format!(
        "{DETAIL_SELECT} WHERE (?1 IS NULL OR b.status = ?1) AND (?2 IS NULL OR s.date = ?2) \
         AND (?3 IS NULL OR b.user_id = ?3) \
         ORDER BY s.date DESC, s.start_time DESC, b.created_at DESC"
    );
    let rows = sqlx::query_as::<_, BookingDetail>(&sql)
        .bind(query.status)
        .bind(query.date.as_deref())
        .bind(query.user_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn user_stats(pool: &SqlitePool, user_id: i64) -> RepoResult<UserBookingStats> {
    let stats = sqlx::query_as::<_, UserBookingStats>(
        "SELECT COUNT(*) AS total, \
             COALESCE(SUM(status = 'confirmed'), 0) AS confirmed, \
             COALESCE(SUM(status = 'completed'), 0) AS completed, \
             COALESCE(SUM(status = 'cancelled'), 0) AS cancelled, \
             COALESCE(SUM(status = 'no-show'), 0) AS no_show \
         FROM bookings WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::gym_session::tests::slot;
    use crate::db::repository::testing::test_pool;
    use crate::db::repository::user::{self, tests::new_student};

    const TODAY: &str = "2099-03-01";

    async fn member(pool: &SqlitePool, n: u32) -> i64 {
        let u = user::create_student(
            pool,
            new_student(&format!("m{n}@my.jcu.edu.au"), &format!("10000{n:02}")),
            "SGD",
        )
        .await
        .unwrap();
        user::approve(pool, u.id).await.unwrap().id
    }

    async fn session(pool: &SqlitePool, date: &str, start: &str, end: &str, cap: i64) -> i64 {
        gym_session::create(pool, &slot(date, start, end, cap))
            .await
            .unwrap()
            .id
    }

    fn code(err: RepoError) -> ErrorCode {
        match err {
            RepoError::Business(code, _) => code,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_book_until_full() {
        let pool = test_pool().await;
        let s = session(&pool, "2099-03-02", "09:00", "10:00", 1).await;
        let a = member(&pool, 1).await;
        let b = member(&pool, 2).await;

        let booking = create(&pool, a, s, TODAY, true).await.unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);

        let err = create(&pool, b, s, TODAY, true).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::SessionFullyBooked);

        // cancellation releases the place
        cancel(&pool, booking.id).await.unwrap();
        create(&pool, b, s, TODAY, true).await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_booking_rejected() {
        let pool = test_pool().await;
        let s = session(&pool, "2099-03-02", "09:00", "10:00", 5).await;
        let a = member(&pool, 1).await;

        create(&pool, a, s, TODAY, true).await.unwrap();
        let err = create(&pool, a, s, TODAY, true).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::DuplicateBooking);

        let err = create(&pool, a, s, TODAY, false).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::DuplicateBooking);
    }

    #[tokio::test]
    async fn test_overlap_check_is_configurable() {
        let pool = test_pool().await;
        let first = session(&pool, "2099-03-02", "09:00", "10:00", 5).await;
        let overlapping = session(&pool, "2099-03-02", "09:30", "10:30", 5).await;
        let adjacent = session(&pool, "2099-03-02", "10:00", "11:00", 5).await;
        let a = member(&pool, 1).await;

        create(&pool, a, first, TODAY, true).await.unwrap();
        let err = create(&pool, a, overlapping, TODAY, true).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::BookingTimeConflict);

        // touching end/start is not an overlap
        create(&pool, a, adjacent, TODAY, true).await.unwrap();

        create(&pool, a, overlapping, TODAY, false).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_inactive_and_past_sessions() {
        let pool = test_pool().await;
        let a = member(&pool, 1).await;

        let err = create(&pool, a, 12345, TODAY, true).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::SessionNotFound);

        let past = session(&pool, "2099-02-27", "09:00", "10:00", 5).await;
        let err = create(&pool, a, past, TODAY, true).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::SessionAlreadyPast);

        let gone = session(&pool, "2099-03-02", "09:00", "10:00", 5).await;
        gym_session::soft_delete(&pool, gone).await.unwrap();
        let err = create(&pool, a, gone, TODAY, true).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::SessionNotFound);
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let pool = test_pool().await;
        let s = session(&pool, "2099-03-02", "09:00", "10:00", 5).await;
        let a = member(&pool, 1).await;
        let booking = create(&pool, a, s, TODAY, true).await.unwrap();

        let first = cancel(&pool, booking.id).await.unwrap();
        assert_eq!(first.status, BookingStatus::Cancelled);
        assert!(first.cancelled_at.is_some());

        let second = cancel(&pool, booking.id).await.unwrap();
        assert_eq!(second.cancelled_at, first.cancelled_at);

        let err = cancel(&pool, 999).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::BookingNotFound);
    }

    #[tokio::test]
    async fn test_admin_update_transitions() {
        let pool = test_pool().await;
        let s = session(&pool, "2099-03-02", "09:00", "10:00", 5).await;
        let a = member(&pool, 1).await;
        let booking = create(&pool, a, s, TODAY, true).await.unwrap();

        let done = admin_update(
            &pool,
            booking.id,
            BookingUpdate {
                status: Some(BookingStatus::Completed),
                check_in_time: Some(1),
                rating: Some(5),
                feedback: Some("Great class".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(done.status, BookingStatus::Completed);
        assert_eq!(done.rating, Some(5));

        // completed bookings cannot be cancelled
        let err = cancel(&pool, booking.id).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::InvalidBookingTransition);

        let err = admin_update(
            &pool,
            booking.id,
            BookingUpdate {
                status: Some(BookingStatus::NoShow),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(code(err), ErrorCode::InvalidBookingTransition);

        let err = admin_update(
            &pool,
            booking.id,
            BookingUpdate {
                rating: Some(6),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(code(err), ErrorCode::InvalidRating);

        // repeating the current status is a no-op that still applies the other fields
        let again = admin_update(
            &pool,
            booking.id,
            BookingUpdate {
                status: Some(BookingStatus::Completed),
                notes: Some("Left early".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(again.status, BookingStatus::Completed);
        assert_eq!(again.notes.as_deref(), Some("Left early"));
        assert_eq!(again.rating, Some(5));

        // completed still occupies a place
        let s = gym_session::find_by_id(&pool, s).await.unwrap().unwrap();
        assert_eq!(s.current_bookings, 1);
    }

    #[tokio::test]
    async fn test_lists_and_stats() {
        let pool = test_pool().await;
        let s1 = session(&pool, "2099-03-02", "09:00", "10:00", 5).await;
        let s2 = session(&pool, "2099-03-03", "09:00", "10:00", 5).await;
        let a = member(&pool, 1).await;
        let b = member(&pool, 2).await;

        let first = create(&pool, a, s1, TODAY, true).await.unwrap();
        create(&pool, a, s2, TODAY, true).await.unwrap();
        create(&pool, b, s1, TODAY, true).await.unwrap();
        cancel(&pool, first.id).await.unwrap();

        let mine = list_for_user(&pool, a).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].session_date, "2099-03-03");

        let roster = list_for_session(&pool, s1).await.unwrap();
        assert_eq!(roster.len(), 2);

        let confirmed = list_admin(
            &pool,
            &BookingQuery {
                status: Some(BookingStatus::Confirmed),
                date: Some("2099-03-02".into()),
                user_id: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(confirmed.len(), 1);
        assert_eq!(confirmed[0].user_id, b);

        let stats = user_stats(&pool, a).await.unwrap();
        assert_eq!(
            stats,
            UserBookingStats {
                total: 2,
                confirmed: 1,
                completed: 0,
                cancelled: 1,
                no_show: 0,
            }
        );
    }
}
