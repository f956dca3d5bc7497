//! Admin dashboard statistics

use axum::{Json, Router, extract::State, middleware, routing::get};

use crate::auth::require_admin;
use crate::core::ServerState;
use crate::db::repository::stats;
use crate::utils::AppResult;

use shared::models::AdminStats;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/admin/stats", get(admin_stats))
        .layer(middleware::from_fn(require_admin))
}

/// Member counts by effective status, booking counts, upcoming sessions, net revenue
pub async fn admin_stats(State(state): State<ServerState>) -> AppResult<Json<AdminStats>> {
    let stats = stats::admin_stats(state.pool(), &state.today()).await?;
    Ok(Json(stats))
}
