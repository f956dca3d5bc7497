//! System settings API

use axum::{Extension, Json, Router, extract::State, middleware, routing::get};

use crate::auth::{CurrentUser, require_admin};
use crate::core::ServerState;
use crate::db::repository::settings;
use crate::utils::AppResult;

use shared::models::{SystemSettings, SystemSettingsUpdate};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/admin/settings", get(get_settings).put(update_settings))
        .layer(middleware::from_fn(require_admin))
}

pub async fn get_settings(State(state): State<ServerState>) -> AppResult<Json<SystemSettings>> {
    Ok(Json(state.settings().await?))
}

/// Patch the switches; absent fields keep their value
pub async fn update_settings(
    State(state): State<ServerState>,
    Extension(admin): Extension<CurrentUser>,
    Json(payload): Json<SystemSettingsUpdate>,
) -> AppResult<Json<SystemSettings>> {
    let updated = settings::update(state.pool(), payload, state.config.gym.max_capacity).await?;
    tracing::info!(
        admin_id = admin.id,
        maintenance = updated.system_maintenance,
        registrations = updated.allow_new_registrations,
        max_capacity = updated.max_session_capacity,
        "System settings updated"
    );
    Ok(Json(updated))
}
