//! Notification Repository
//!
//! A notification with `user_id IS NULL` is a broadcast; it is never copied
//! per user. Read and dismiss state lives in `notification_receipts`.

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{Notification, NotificationCreate};
use sqlx::SqlitePool;

const NOTIFICATION_COLUMNS: &str = "n.id, n.title, n.message, n.notification_type, n.priority, n.action_url, n.user_id, n.created_by, \
     (r.read_at IS NOT NULL) AS is_read, r.read_at, n.created_at";

fn not_found(id: i64) -> RepoError {
    RepoError::Business(
        ErrorCode::NotificationNotFound,
        format!("Notification {id} not found"),
    )
}

/// Create a targeted or broadcast notification
pub async fn create(
    pool: &SqlitePool,
    data: &NotificationCreate,
    created_by: i64,
) -> RepoResult<Notification> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "INSERT INTO notifications (id, title, message, notification_type, priority, action_url, user_id, created_by, created_at) \
         SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9 \
         WHERE ?7 IS NULL OR EXISTS (SELECT 1 FROM users WHERE id = ?7)",
    )
    .bind(id)
    .bind(data.title.trim())
    .bind(data.message.trim())
    .bind(data.notification_type)
    .bind(data.priority)
    .bind(&data.action_url)
    .bind(data.user_id)
    .bind(created_by)
    .bind(now)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::UserNotFound,
            format!("User {} not found", data.user_id.unwrap_or_default()),
        ));
    }

    let sql = format!(
        "SELECT {NOTIFICATION_COLUMNS} FROM notifications n \
         LEFT JOIN notification_receipts r ON r.notification_id = n.id AND r.user_id = n.user_id \
         WHERE n.id = ?"
    );
    sqlx::query_as::<_, Notification>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create notification".into()))
}

/// Notifications visible to a user (own + broadcasts, minus dismissed), newest first
pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Notification>> {
    let sql = format!(
        "SELECT {NOTIFICATION_COLUMNS} FROM notifications n \
         LEFT JOIN notification_receipts r ON r.notification_id = n.id AND r.user_id = ?1 \
         WHERE (n.user_id = ?1 OR n.user_id IS NULL) AND r.dismissed_at IS NULL \
         ORDER BY n.created_at DESC"
    );
    let rows = sqlx::query_as::<_, Notification>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn unread_count(pool: &SqlitePool, user_id: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM notifications n \
         LEFT JOIN notification_receipts r ON r.notification_id = n.id AND r.user_id = ?1 \
         WHERE (n.user_id = ?1 OR n.user_id IS NULL) AND r.dismissed_at IS NULL AND r.read_at IS NULL",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Mark one visible notification read for this user
pub async fn mark_read(pool: &SqlitePool, id: i64, user_id: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "INSERT INTO notification_receipts (notification_id, user_id, read_at) \
         SELECT n.id, ?2, ?3 FROM notifications n WHERE n.id = ?1 AND (n.user_id = ?2 OR n.user_id IS NULL) \
         ON CONFLICT(notification_id, user_id) DO UPDATE SET read_at = COALESCE(read_at, excluded.read_at)",
    )
    .bind(id)
    .bind(user_id)
    .bind(now)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

/// Mark every unread visible notification read; returns how many changed
pub async fn mark_all_read(pool: &SqlitePool, user_id: i64) -> RepoResult<u64> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "INSERT INTO notification_receipts (notification_id, user_id, read_at) \
         SELECT n.id, ?1, ?2 FROM notifications n \
         WHERE (n.user_id = ?1 OR n.user_id IS NULL) \
         AND NOT EXISTS (SELECT 1 FROM notification_receipts r WHERE r.notification_id = n.id AND r.user_id = ?1 \
                         AND (r.read_at IS NOT NULL OR r.dismissed_at IS NOT NULL)) \
         ON CONFLICT(notification_id, user_id) DO UPDATE SET read_at = excluded.read_at",
    )
    .bind(user_id)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}

/// Delete for one user: a targeted notification is removed, a broadcast is
/// only dismissed for this reader
pub async fn delete_for_user(pool: &SqlitePool, id: i64, user_id: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let deleted = sqlx::query("DELETE FROM notifications WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    if deleted.rows_affected() == 0 {
        let dismissed = sqlx::query(
            "INSERT INTO notification_receipts (notification_id, user_id, dismissed_at) \
             SELECT n.id, ?2, ?3 FROM notifications n WHERE n.id = ?1 AND n.user_id IS NULL \
             ON CONFLICT(notification_id, user_id) DO UPDATE SET dismissed_at = COALESCE(dismissed_at, excluded.dismissed_at)",
        )
        .bind(id)
        .bind(user_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        if dismissed.rows_affected() == 0 {
            return Err(not_found(id));
        }
    }

    tx.commit().await?;
    Ok(())
}

/// Clear a user's inbox; returns the number of notifications removed or dismissed
pub async fn delete_all_for_user(pool: &SqlitePool, user_id: i64) -> RepoResult<u64> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let deleted = sqlx::query("DELETE FROM notifications WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let dismissed = sqlx::query(
        "INSERT INTO notification_receipts (notification_id, user_id, dismissed_at) \
         SELECT n.id, ?1, ?2 FROM notifications n \
         WHERE n.user_id IS NULL \
         AND NOT EXISTS (SELECT 1 FROM notification_receipts r WHERE r.notification_id = n.id AND r.user_id = ?1 AND r.dismissed_at IS NOT NULL) \
         ON CONFLICT(notification_id, user_id) DO UPDATE SET dismissed_at = excluded.dismissed_at",
    )
    .bind(user_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(deleted.rows_affected() + dismissed.rows_affected())
}

/// Every notification, newest first; `is_read` reflects the target for
/// targeted notifications and is false for broadcasts
pub async fn list_all(pool: &SqlitePool) -> RepoResult<Vec<Notification>> {
    let sql = format!(
        "SELECT {NOTIFICATION_COLUMNS} FROM notifications n \
         LEFT JOIN notification_receipts r ON r.notification_id = n.id AND r.user_id = n.user_id \
         ORDER BY n.created_at DESC"
    );
    let rows = sqlx::query_as::<_, Notification>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

/// Global delete (admin); receipts cascade
pub async fn hard_delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM notifications WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::test_pool;
    use crate::db::repository::user::{self, tests::new_student};
    use shared::models::{NotificationPriority, NotificationType};

    fn message(title: &str, user_id: Option<i64>) -> NotificationCreate {
        NotificationCreate {
            title: title.into(),
            message: "Body".into(),
            notification_type: NotificationType::Announcement,
            priority: NotificationPriority::High,
            user_id,
            action_url: None,
        }
    }

    async fn two_users(pool: &SqlitePool) -> (i64, i64) {
        let a = user::create_student(pool, new_student("a@my.jcu.edu.au", "1111111"), "SGD")
            .await
            .unwrap();
        let b = user::create_student(pool, new_student("b@my.jcu.edu.au", "2222222"), "SGD")
            .await
            .unwrap();
        (a.id, b.id)
    }

    #[tokio::test]
    async fn test_targeted_and_broadcast_visibility() {
        let pool = test_pool().await;
        let (a, b) = two_users(&pool).await;
        create(&pool, &message("All", None), 1).await.unwrap();
        create(&pool, &message("Only A", Some(a)), 1).await.unwrap();

        assert_eq!(list_for_user(&pool, a).await.unwrap().len(), 2);
        let for_b = list_for_user(&pool, b).await.unwrap();
        assert_eq!(for_b.len(), 1);
        assert_eq!(for_b[0].title, "All");
        assert_eq!(for_b[0].notification_type, NotificationType::Announcement);

        let err = create(&pool, &message("Ghost", Some(404)), 1).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::UserNotFound, _)));
    }

    #[tokio::test]
    async fn test_read_state_is_per_user() {
        let pool = test_pool().await;
        let (a, b) = two_users(&pool).await;
        let all = create(&pool, &message("All", None), 1).await.unwrap();
        create(&pool, &message("Only A", Some(a)), 1).await.unwrap();

        mark_read(&pool, all.id, a).await.unwrap();
        assert_eq!(unread_count(&pool, a).await.unwrap(), 1);
        assert_eq!(unread_count(&pool, b).await.unwrap(), 1);

        let listed = list_for_user(&pool, a).await.unwrap();
        let broadcast = listed.iter().find(|n| n.id == all.id).unwrap();
        assert!(broadcast.is_read);
        assert!(broadcast.read_at.is_some());

        assert_eq!(mark_all_read(&pool, a).await.unwrap(), 1);
        assert_eq!(unread_count(&pool, a).await.unwrap(), 0);
        assert_eq!(mark_all_read(&pool, a).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_read_requires_visibility() {
        let pool = test_pool().await;
        let (a, b) = two_users(&pool).await;
        let private = create(&pool, &message("Only A", Some(a)), 1).await.unwrap();
        let err = mark_read(&pool, private.id, b).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::NotificationNotFound, _)));
    }

    #[tokio::test]
    async fn test_broadcast_dismissal_is_per_user() {
        let pool = test_pool().await;
        let (a, b) = two_users(&pool).await;
        let all = create(&pool, &message("All", None), 1).await.unwrap();
        let private = create(&pool, &message("Only A", Some(a)), 1).await.unwrap();

        delete_for_user(&pool, all.id, a).await.unwrap();
        assert_eq!(list_for_user(&pool, a).await.unwrap().len(), 1);
        assert_eq!(list_for_user(&pool, b).await.unwrap().len(), 1);

        // b cannot delete a's notification
        let err = delete_for_user(&pool, private.id, b).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::NotificationNotFound, _)));

        delete_for_user(&pool, private.id, a).await.unwrap();
        assert!(list_for_user(&pool, a).await.unwrap().is_empty());
        assert_eq!(list_all(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_all_and_hard_delete() {
        let pool = test_pool().await;
        let (a, b) = two_users(&pool).await;
        let all = create(&pool, &message("All", None), 1).await.unwrap();
        create(&pool, &message("Only A", Some(a)), 1).await.unwrap();

        assert_eq!(delete_all_for_user(&pool, a).await.unwrap(), 2);
        assert!(list_for_user(&pool, a).await.unwrap().is_empty());
        assert_eq!(list_for_user(&pool, b).await.unwrap().len(), 1);

        hard_delete(&pool, all.id).await.unwrap();
        assert!(list_for_user(&pool, b).await.unwrap().is_empty());
        let err = hard_delete(&pool, all.id).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::NotificationNotFound, _)));
    }
}
