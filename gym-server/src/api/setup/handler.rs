//! Setup API Handlers

use axum::{Json, extract::State};
use validator::Validate;

use crate::auth::hash_password;
use crate::core::ServerState;
use crate::db::repository::user;
use crate::utils::AppResult;
use crate::utils::validation::validate_password;

use shared::client::{SetupRequest, SetupStatus};
use shared::models::UserProfile;

/// Whether the first admin still has to be created
pub async fn status(State(state): State<ServerState>) -> AppResult<Json<SetupStatus>> {
    let has_admin = user::admin_exists(state.pool()).await?;
    Ok(Json(SetupStatus {
        needs_setup: !has_admin,
    }))
}

/// Create the first admin account
pub async fn create_admin(
    State(state): State<ServerState>,
    Json(req): Json<SetupRequest>,
) -> AppResult<Json<UserProfile>> {
    req.validate()?;
    validate_password(&req.password)?;

    let password_hash = hash_password(&req.password)?;
    let admin = user::create_first_admin(
        state.pool(),
        &req.email,
        &password_hash,
        &req.first_name,
        &req.last_name,
    )
    .await?;

    crate::security_log!("INFO", "admin_created", user_id = admin.id, email = admin.email.clone());
    Ok(Json(admin.into_profile(&state.today())))
}
