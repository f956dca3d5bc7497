//! Dashboard aggregates

use super::RepoResult;
use shared::models::{AdminStats, BookingCounts, UserCounts};
use sqlx::SqlitePool;

/// Admin dashboard counters; `today` decides derived expiry and "upcoming"
pub async fn admin_stats(pool: &SqlitePool, today: &str) -> RepoResult<AdminStats> {
    let (total, pending, approved, suspended, expired): (i64, i64, i64, i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), \
             COALESCE(SUM(status = 'pending'), 0), \
             COALESCE(SUM(status = 'approved' AND (expiry_date IS NULL OR expiry_date >= ?1)), 0), \
             COALESCE(SUM(status = 'suspended'), 0), \
             COALESCE(SUM(status = 'approved' AND expiry_date < ?1), 0) \
         FROM users WHERE role = 'student'",
    )
    .bind(today)
    .fetch_one(pool)
    .await?;

    let (b_total, confirmed, completed, cancelled, no_show): (i64, i64, i64, i64, i64) =
        sqlx::query_as(
            "SELECT COUNT(*), \
                 COALESCE(SUM(status = 'confirmed'), 0), \
                 COALESCE(SUM(status = 'completed'), 0), \
                 COALESCE(SUM(status = 'cancelled'), 0), \
                 COALESCE(SUM(status = 'no-show'), 0) \
             FROM bookings",
        )
        .fetch_one(pool)
        .await?;

    let upcoming_sessions: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM gym_sessions WHERE is_active = 1 AND date >= ?")
            .bind(today)
            .fetch_one(pool)
            .await?;

    let revenue: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(CASE transaction_type WHEN 'payment' THEN amount ELSE -amount END), 0.0) \
         FROM billing_transactions WHERE status = 'completed'",
    )
    .fetch_one(pool)
    .await?;

    Ok(AdminStats {
        users: UserCounts {
            total,
            pending,
            approved,
            suspended,
            expired,
        },
        bookings: BookingCounts {
            total: b_total,
            confirmed,
            completed,
            cancelled,
            no_show,
        },
        upcoming_sessions,
        revenue,
    })
}
