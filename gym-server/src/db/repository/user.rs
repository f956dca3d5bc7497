//! User Repository
//!
//! Students and admins share the `users` table. `expired` is never stored;
//! list filters derive it from `expiry_date` against the caller's `today`.

use super::{RepoError, RepoResult, like_pattern};
use shared::error::ErrorCode;
use shared::models::{MembershipType, User, UserQuery, UserRole, UserStatus, UserUpdate};
use sqlx::{SqliteConnection, SqlitePool};

const USER_SELECT: &str = "SELECT id, email, password_hash, first_name, last_name, student_id, phone, role, membership_type, status, expiry_date, approval_date, payment_status, payment_method, payment_amount, payment_reference, payment_date, emergency_contact_name, emergency_contact_phone, emergency_contact_relation, billing_address, created_at, updated_at FROM users";

/// New student registration (already validated, password already hashed)
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub student_id: String,
    pub phone: Option<String>,
    pub membership_type: MembershipType,
    pub payment_method: String,
    pub payment_reference: String,
    pub expiry_date: String,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub emergency_contact_relation: Option<String>,
    pub billing_address: Option<String>,
}

/// Map unique violations on `users` to the specific member error codes
fn map_duplicate(err: RepoError) -> RepoError {
    match err {
        RepoError::Duplicate(msg) if msg.contains("student_id") => {
            RepoError::business(ErrorCode::StudentIdAlreadyExists)
        }
        RepoError::Duplicate(msg) if msg.contains("email") => {
            RepoError::business(ErrorCode::EmailAlreadyExists)
        }
        other => other,
    }
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

async fn find_by_id_conn(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

/// Emails are stored lowercase
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE email = ?");
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(email.trim().to_lowercase())
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn admin_exists(pool: &SqlitePool) -> RepoResult<bool> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE role = 'admin')")
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

/// Student list filtered by effective status and a free-text search
pub async fn list_students(
    pool: &SqlitePool,
    query: &UserQuery,
    today: &str,
) -> RepoResult<Vec<User>> {
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(like_pattern);
    let sql = format!(
        "{USER_SELECT} WHERE role = 'student' \
         AND (?1 IS NULL \
              OR (?1 = 'expired' AND status = 'approved' AND expiry_date IS NOT NULL AND expiry_date < ?2) \
              OR (?1 = 'approved' AND status = 'approved' AND (expiry_date IS NULL OR expiry_date >= ?2)) \
              OR (?1 IN ('pending', 'suspended') AND status = ?1)) \
         AND (?3 IS NULL OR first_name LIKE ?3 ESCAPE '\\' OR last_name LIKE ?3 ESCAPE '\\' \
              OR (first_name || ' ' || last_name) LIKE ?3 ESCAPE '\\' \
              OR email LIKE ?3 ESCAPE '\\' OR student_id LIKE ?3 ESCAPE '\\') \
         ORDER BY created_at DESC"
    );

    let rows = sqlx::query_as::<_, User>(&sql)
        .bind(query.status.map(|s| s.as_str()))
        .bind(today)
        .bind(search)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn list_pending(pool: &SqlitePool) -> RepoResult<Vec<User>> {
    let sql = format!("{USER_SELECT} WHERE role = 'student' AND status = 'pending' ORDER BY created_at ASC");
    let rows = sqlx::query_as::<_, User>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

/// Create a pending student and its pending membership payment in one transaction
pub async fn create_student(
    pool: &SqlitePool,
    data: NewStudent,
    currency: &str,
) -> RepoResult<User> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    let amount = data.membership_type.price();

    let mut tx = pool.begin().await?;
    sqlx::query(
        "INSERT INTO users (id, email, password_hash, first_name, last_name, student_id, phone, role, membership_type, status, expiry_date, payment_status, payment_method, payment_amount, payment_reference, emergency_contact_name, emergency_contact_phone, emergency_contact_relation, billing_address, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'student', ?8, 'pending', ?9, 'pending', ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?17)",
    )
    .bind(id)
    .bind(data.email.trim().to_lowercase())
    .bind(&data.password_hash)
    .bind(data.first_name.trim())
    .bind(data.last_name.trim())
    .bind(&data.student_id)
    .bind(&data.phone)
    .bind(data.membership_type)
    .bind(&data.expiry_date)
    .bind(&data.payment_method)
    .bind(amount)
    .bind(&data.payment_reference)
    .bind(&data.emergency_contact_name)
    .bind(&data.emergency_contact_phone)
    .bind(&data.emergency_contact_relation)
    .bind(&data.billing_address)
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(|e| map_duplicate(e.into()))?;

    sqlx::query(
        "INSERT INTO billing_transactions (id, user_id, transaction_type, amount, currency, status, payment_method, payment_reference, description, created_at, updated_at) \
         VALUES (?1, ?2, 'payment', ?3, ?4, 'pending', ?5, ?6, ?7, ?8, ?8)",
    )
    .bind(shared::util::snowflake_id())
    .bind(id)
    .bind(amount)
    .bind(currency)
    .bind(&data.payment_method)
    .bind(&data.payment_reference)
    .bind(format!("Membership payment - {}", data.membership_type.as_str()))
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let user = find_by_id_conn(&mut tx, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))?;
    tx.commit().await?;
    Ok(user)
}

/// Create the first admin; refused once any admin exists
pub async fn create_first_admin(
    pool: &SqlitePool,
    email: &str,
    password_hash: &str,
    first_name: &str,
    last_name: &str,
) -> RepoResult<User> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    let rows = sqlx::query(
        "INSERT INTO users (id, email, password_hash, first_name, last_name, role, status, approval_date, payment_status, created_at, updated_at) \
         SELECT ?1, ?2, ?3, ?4, ?5, 'admin', 'approved', ?6, 'paid', ?6, ?6 \
         WHERE NOT EXISTS (SELECT 1 FROM users WHERE role = 'admin')",
    )
    .bind(id)
    .bind(email.trim().to_lowercase())
    .bind(password_hash)
    .bind(first_name.trim())
    .bind(last_name.trim())
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| map_duplicate(e.into()))?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::business(ErrorCode::AdminAlreadyExists));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create admin".into()))
}

/// Tell apart "no such student" from a guarded update that matched nothing
async fn require_student(conn: &mut SqliteConnection, id: i64) -> RepoResult<User> {
    match find_by_id_conn(conn, id).await? {
        Some(user) if user.role == UserRole::Student => Ok(user),
        Some(_) => Err(RepoError::business(ErrorCode::CannotModifyAdmin)),
        None => Err(RepoError::Business(
            ErrorCode::UserNotFound,
            format!("User {id} not found"),
        )),
    }
}

/// Approve a student: status, approval date and payment state, plus every
/// pending billing transaction, in one transaction. Re-approving is a no-op.
pub async fn approve(pool: &SqlitePool, id: i64) -> RepoResult<User> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    // Write first so the transaction holds the write lock before any read
    let rows = sqlx::query(
        "UPDATE users SET status = 'approved', \
             approval_date = CASE WHEN status = 'approved' AND approval_date IS NOT NULL THEN approval_date ELSE ?1 END, \
             payment_status = 'paid', payment_date = COALESCE(payment_date, ?1), updated_at = ?1 \
         WHERE id = ?2 AND role = 'student' AND (status != 'approved' OR payment_status != 'paid')",
    )
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if rows.rows_affected() == 0 {
        // Missing, admin, or already approved
        require_student(&mut tx, id).await?;
    }

    sqlx::query(
        "UPDATE billing_transactions SET status = 'completed', completed_at = ?1, updated_at = ?1 \
         WHERE user_id = ?2 AND status = 'pending'",
    )
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    let user = require_student(&mut tx, id).await?;
    tx.commit().await?;
    Ok(user)
}

/// Reject a student: suspend, fail a pending payment and cancel pending
/// billing transactions, in one transaction. Re-rejecting is a no-op.
pub async fn reject(pool: &SqlitePool, id: i64) -> RepoResult<User> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let rows = sqlx::query(
        "UPDATE users SET status = 'suspended', \
             payment_status = CASE WHEN payment_status = 'pending' THEN 'failed' ELSE payment_status END, \
             updated_at = ?1 \
         WHERE id = ?2 AND role = 'student' AND (status != 'suspended' OR payment_status = 'pending')",
    )
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if rows.rows_affected() == 0 {
        require_student(&mut tx, id).await?;
    }

    sqlx::query(
        "UPDATE billing_transactions SET status = 'cancelled', updated_at = ?1 \
         WHERE user_id = ?2 AND status = 'pending'",
    )
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    let user = require_student(&mut tx, id).await?;
    tx.commit().await?;
    Ok(user)
}

/// Admin edit of a student's profile, membership, expiry and status
///
/// Status only toggles between `approved` and `suspended`; a pending account
/// must go through approval.
pub async fn update(pool: &SqlitePool, id: i64, data: UserUpdate) -> RepoResult<User> {
    let status = match data.status {
        None => None,
        Some(s @ (UserStatus::Approved | UserStatus::Suspended)) => Some(s),
        Some(other) => {
            return Err(RepoError::Business(
                ErrorCode::InvalidUserStatusTransition,
                format!("Status cannot be set to {}", other.as_str()),
            ));
        }
    };

    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;
    let rows = sqlx::query(
        "UPDATE users SET \
             email = COALESCE(?1, email), first_name = COALESCE(?2, first_name), last_name = COALESCE(?3, last_name), \
             phone = COALESCE(?4, phone), membership_type = COALESCE(?5, membership_type), \
             expiry_date = COALESCE(?6, expiry_date), status = COALESCE(?7, status), \
             emergency_contact_name = COALESCE(?8, emergency_contact_name), \
             emergency_contact_phone = COALESCE(?9, emergency_contact_phone), \
             emergency_contact_relation = COALESCE(?10, emergency_contact_relation), \
             billing_address = COALESCE(?11, billing_address), updated_at = ?12 \
         WHERE id = ?13 AND role = 'student' AND (?7 IS NULL OR status != 'pending')",
    )
    .bind(data.email.map(|e| e.trim().to_lowercase()))
    .bind(data.first_name)
    .bind(data.last_name)
    .bind(data.phone)
    .bind(data.membership_type)
    .bind(data.expiry_date)
    .bind(status)
    .bind(data.emergency_contact_name)
    .bind(data.emergency_contact_phone)
    .bind(data.emergency_contact_relation)
    .bind(data.billing_address)
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await
    .map_err(|e| map_duplicate(e.into()))?;

    if rows.rows_affected() == 0 {
        require_student(&mut tx, id).await?;
        return Err(RepoError::Business(
            ErrorCode::InvalidUserStatusTransition,
            "Pending accounts must be approved or rejected first".into(),
        ));
    }

    let user = require_student(&mut tx, id).await?;
    tx.commit().await?;
    Ok(user)
}

/// Replace email and/or password hash (admin self-service)
pub async fn update_credentials(
    pool: &SqlitePool,
    id: i64,
    email: Option<&str>,
    password_hash: Option<&str>,
) -> RepoResult<User> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE users SET email = COALESCE(?1, email), password_hash = COALESCE(?2, password_hash), updated_at = ?3 WHERE id = ?4",
    )
    .bind(email.map(|e| e.trim().to_lowercase()))
    .bind(password_hash)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| map_duplicate(e.into()))?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::UserNotFound,
            format!("User {id} not found"),
        ));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Business(ErrorCode::UserNotFound, format!("User {id} not found")))
}
