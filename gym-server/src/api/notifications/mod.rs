//! Notification API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::auth::require_admin;
use crate::core::ServerState;

/// Notification router
/// - /api/notifications: per-reader read and dismiss state
/// - /api/admin/notifications: send, list, global delete
pub fn router() -> Router<ServerState> {
    let reader_routes = Router::new()
        .route(
            "/api/notifications",
            get(handler::list_own).delete(handler::delete_all),
        )
        .route("/api/notifications/unread-count", get(handler::unread_count))
        .route("/api/notifications/read-all", post(handler::mark_all_read))
        .route("/api/notifications/{id}", delete(handler::delete_one))
        .route("/api/notifications/{id}/read", post(handler::mark_read));

    let admin_routes = Router::new()
        .route(
            "/api/admin/notifications",
            get(handler::list_all).post(handler::create),
        )
        .route("/api/admin/notifications/{id}", delete(handler::hard_delete))
        .layer(middleware::from_fn(require_admin));

    reader_routes.merge(admin_routes)
}
