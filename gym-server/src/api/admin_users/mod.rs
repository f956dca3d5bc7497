//! Admin member management API

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

/// Admin user router (all routes admin only)
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/admin/users", get(handler::list))
        .route(
            "/api/admin/users/{id}",
            get(handler::get_by_id).put(handler::update),
        )
        .route("/api/admin/pending-users", get(handler::list_pending))
        .route("/api/admin/approve-user", post(handler::approve))
        .route("/api/admin/profile", put(handler::change_profile))
        .layer(middleware::from_fn(require_admin))
}
