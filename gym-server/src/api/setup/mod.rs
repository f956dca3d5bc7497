//! First-run setup API

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Setup router (public; creating the admin only works once)
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/setup", get(handler::status).post(handler::create_admin))
}
