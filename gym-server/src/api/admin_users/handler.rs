//! Admin User Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use validator::ValidateEmail;

use crate::auth::{CurrentUser, hash_password, verify_password};
use crate::core::ServerState;
use crate::db::repository::user;
use crate::security_log;
use crate::utils::time::parse_date;
use crate::utils::validation::{
    MAX_NAME_LEN, validate_email_domain, validate_optional_text, validate_password,
    validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};

use shared::client::{ApprovalAction, ApproveUserRequest, ProfileChange};
use shared::models::{UserProfile, UserQuery, UserUpdate};

/// List students filtered by status (including derived `expired`) and search text
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<Vec<UserProfile>>> {
    let today = state.today();
    let users = user::list_students(state.pool(), &query, &today).await?;
    Ok(Json(
        users.into_iter().map(|u| u.into_profile(&today)).collect(),
    ))
}

/// Get one user
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<UserProfile>> {
    let found = user::find_by_id(state.pool(), id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    Ok(Json(found.into_profile(&state.today())))
}

/// Accounts awaiting approval, oldest first
pub async fn list_pending(State(state): State<ServerState>) -> AppResult<Json<Vec<UserProfile>>> {
    let today = state.today();
    let users = user::list_pending(state.pool()).await?;
    Ok(Json(
        users.into_iter().map(|u| u.into_profile(&today)).collect(),
    ))
}

/// Edit a student's profile, membership, expiry or status
pub async fn update(
    State(state): State<ServerState>,
    Extension(admin): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<UserProfile>> {
    if let Some(email) = payload.email.as_deref() {
        validate_email_domain(email, &state.config.gym.allowed_email_domain)?;
    }
    if let Some(first) = payload.first_name.as_deref() {
        validate_required_text(first, "first_name", MAX_NAME_LEN)?;
    }
    if let Some(last) = payload.last_name.as_deref() {
        validate_required_text(last, "last_name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.emergency_contact_name, "emergency_contact_name", MAX_NAME_LEN)?;
    if let Some(expiry) = payload.expiry_date.as_deref() {
        parse_date(expiry)?;
    }

    let updated = user::update(state.pool(), id, payload).await?;
    tracing::info!(
        user_id = id,
        status = updated.status.as_str(),
        admin_id = admin.id,
        "User updated"
    );
    Ok(Json(updated.into_profile(&state.today())))
}

/// Approve or reject a registration
pub async fn approve(
    State(state): State<ServerState>,
    Extension(admin): Extension<CurrentUser>,
    Json(req): Json<ApproveUserRequest>,
) -> AppResult<Json<UserProfile>> {
    let result = match req.action {
        ApprovalAction::Approve => user::approve(state.pool(), req.user_id).await?,
        ApprovalAction::Reject => user::reject(state.pool(), req.user_id).await?,
    };

    tracing::info!(
        user_id = req.user_id,
        action = ?req.action,
        admin_id = admin.id,
        "Registration reviewed"
    );
    Ok(Json(result.into_profile(&state.today())))
}

/// Change the admin's own email and/or password
///
/// Requires the current password.
pub async fn change_profile(
    State(state): State<ServerState>,
    Extension(admin): Extension<CurrentUser>,
    Json(req): Json<ProfileChange>,
) -> AppResult<Json<UserProfile>> {
    let account = user::find_by_id(state.pool(), admin.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    if !verify_password(&req.current_password, &account.password_hash) {
        security_log!("WARN", "profile_change_denied", user_id = admin.id);
        return Err(AppError::invalid_credentials());
    }

    if req.new_email.is_none() && req.new_password.is_none() {
        return Err(AppError::validation("Nothing to change"));
    }
    if let Some(email) = req.new_email.as_deref()
        && !email.validate_email()
    {
        return Err(AppError::validation("Invalid email address").with_detail("field", "new_email"));
    }

    let password_hash = match req.new_password.as_deref() {
        Some(p) => {
            validate_password(p)?;
            Some(hash_password(p)?)
        }
        None => None,
    };

    let updated = user::update_credentials(
        state.pool(),
        admin.id,
        req.new_email.as_deref(),
        password_hash.as_deref(),
    )
    .await?;

    security_log!(
        "INFO",
        "profile_changed",
        user_id = admin.id,
        email_changed = req.new_email.is_some(),
        password_changed = password_hash.is_some()
    );
    Ok(Json(updated.into_profile(&state.today())))
}
