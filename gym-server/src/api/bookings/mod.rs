//! Booking API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

/// Booking router
/// - /api/bookings: members book, list and cancel their own bookings
/// - /api/admin/bookings: admin-wide listing
pub fn router() -> Router<ServerState> {
    let member_routes = Router::new()
        .route("/api/bookings", get(handler::list_own).post(handler::create))
        .route("/api/bookings/stats", get(handler::stats))
        .route("/api/bookings/{id}", put(handler::update));

    let admin_routes = Router::new()
        .route("/api/admin/bookings", get(handler::list_admin))
        .layer(middleware::from_fn(require_admin));

    member_routes.merge(admin_routes)
}
