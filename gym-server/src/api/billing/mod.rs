//! Billing API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

/// Billing router
/// - /api/billing: the member's own transactions
/// - /api/admin/billing: ledger, manual entries, status changes
pub fn router() -> Router<ServerState> {
    let admin_routes = Router::new()
        .route(
            "/api/admin/billing",
            get(handler::list_admin).post(handler::create_manual),
        )
        .route("/api/admin/billing/{id}/status", put(handler::update_status))
        .layer(middleware::from_fn(require_admin));

    Router::new()
        .route("/api/billing", get(handler::list_own))
        .merge(admin_routes)
}
