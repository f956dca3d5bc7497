//! Billing Repository
//!
//! The ledger is append-only: after insert only `status` and its timestamps
//! change.

use super::{RepoError, RepoResult, like_pattern};
use shared::error::ErrorCode;
use shared::models::{
    BillingQuery, BillingTransaction, BillingTransactionDetail, ManualTransactionCreate,
    TransactionStatus, TransactionType,
};
use sqlx::{SqliteConnection, SqlitePool};

const TX_COLUMNS: &str = "t.id, t.user_id, t.transaction_type, t.amount, t.currency, t.status, t.payment_method, t.payment_reference, t.description, t.processed_by, t.completed_at, t.created_at, t.updated_at";

fn not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::TransactionNotFound, format!("Transaction {id} not found"))
}

async fn find_by_id_conn(
    conn: &mut SqliteConnection,
    id: i64,
) -> RepoResult<Option<BillingTransaction>> {
    let sql = format!("SELECT {TX_COLUMNS} FROM billing_transactions t WHERE t.id = ?");
    let row = sqlx::query_as::<_, BillingTransaction>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<BillingTransaction>> {
    let mut conn = pool.acquire().await?;
    find_by_id_conn(&mut conn, id).await
}

/// Admin ledger view joined with the member
pub async fn list_admin(
    pool: &SqlitePool,
    query: &BillingQuery,
) -> RepoResult<Vec<BillingTransactionDetail>> {
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(like_pattern);
    let sql = format!(
        "SELECT {TX_COLUMNS}, u.first_name, u.last_name, u.email, u.student_id \
         FROM billing_transactions t JOIN users u ON u.id = t.user_id \
         WHERE (?1 IS NULL OR t.status = ?1) AND (?2 IS NULL OR t.payment_method = ?2) \
         AND (?3 IS NULL OR u.first_name LIKE ?3 ESCAPE '\\' OR u.last_name LIKE ?3 ESCAPE '\\' \
              OR u.email LIKE ?3 ESCAPE '\\' OR u.student_id LIKE ?3 ESCAPE '\\' \
              OR t.payment_reference LIKE ?3 ESCAPE '\\') \
         ORDER BY t.created_at DESC"
    );
    let rows = sqlx::query_as::<_, BillingTransactionDetail>(&sql)
        .bind(query.status)
        .bind(query.payment_method.as_deref())
        .bind(search)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<BillingTransaction>> {
    let sql = format!(
        "SELECT {TX_COLUMNS} FROM billing_transactions t WHERE t.user_id = ? ORDER BY t.created_at DESC"
    );
    let rows = sqlx::query_as::<_, BillingTransaction>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Record a completed manual payment or refund and update the member's
/// payment state in the same transaction
pub async fn create_manual(
    pool: &SqlitePool,
    data: &ManualTransactionCreate,
    processed_by: i64,
    currency: &str,
    reference: &str,
) -> RepoResult<BillingTransaction> {
    if !(data.amount.is_finite() && data.amount > 0.0) {
        return Err(RepoError::business(ErrorCode::InvalidAmount));
    }

    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    let mut tx = pool.begin().await?;

    let user_update = match data.transaction_type {
        TransactionType::Payment => {
            "UPDATE users SET payment_status = 'paid', payment_date = ?1, updated_at = ?1 WHERE id = ?2"
        }
        TransactionType::Refund => {
            "UPDATE users SET payment_status = 'refunded', updated_at = ?1 WHERE id = ?2"
        }
    };
    let rows = sqlx::query(user_update)
        .bind(now)
        .bind(data.user_id)
        .execute(&mut *tx)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::UserNotFound,
            format!("User {} not found", data.user_id),
        ));
    }

    sqlx::query(
        "INSERT INTO billing_transactions (id, user_id, transaction_type, amount, currency, status, payment_method, payment_reference, description, processed_by, completed_at, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, 'completed', ?6, ?7, ?8, ?9, ?10, ?10, ?10)",
    )
    .bind(id)
    .bind(data.user_id)
    .bind(data.transaction_type)
    .bind(data.amount)
    .bind(currency)
    .bind(&data.payment_method)
    .bind(reference)
    .bind(&data.description)
    .bind(processed_by)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let created = find_by_id_conn(&mut tx, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create transaction".into()))?;
    tx.commit().await?;
    Ok(created)
}

/// Move a transaction along `pending -> completed | cancelled`,
/// `completed -> refunded`. Same status is a no-op.
pub async fn update_status(
    pool: &SqlitePool,
    id: i64,
    next: TransactionStatus,
) -> RepoResult<BillingTransaction> {
    let current = find_by_id(pool, id).await?.ok_or_else(|| not_found(id))?;
    if current.status == next {
        return Ok(current);
    }
    if !current.status.can_transition_to(next) {
        return Err(RepoError::Business(
            ErrorCode::InvalidTransactionTransition,
            format!(
                "Cannot move transaction from {} to {}",
                current.status.as_str(),
                next.as_str()
            ),
        ));
    }

    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE billing_transactions SET status = ?1, \
             completed_at = CASE WHEN ?1 = 'completed' THEN ?2 ELSE completed_at END, updated_at = ?2 \
         WHERE id = ?3 AND status = ?4",
    )
    .bind(next)
    .bind(now)
    .bind(id)
    .bind(current.status)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        // Someone else moved it first
        return Err(RepoError::business(ErrorCode::InvalidTransactionTransition));
    }
    find_by_id(pool, id).await?.ok_or_else(|| not_found(id))
}
