//! Authentication Routes

mod handler;

use axum::{Router, middleware, routing::get, routing::post};

use crate::auth::{login_rate_limit, register_rate_limit};
use crate::core::ServerState;

/// Build authentication router
/// - /api/auth/login, /api/auth/register: public, rate limited per IP
/// - /api/auth/me, /api/auth/logout: protected (auth middleware handled at Router level)
pub fn router(state: &ServerState) -> Router<ServerState> {
    let login = Router::new()
        .route("/api/auth/login", post(handler::login))
        .layer(middleware::from_fn_with_state(state.clone(), login_rate_limit));

    let register = Router::new()
        .route("/api/auth/register", post(handler::register))
        .layer(middleware::from_fn_with_state(state.clone(), register_rate_limit));

    Router::new()
        .merge(login)
        .merge(register)
        .route("/api/auth/me", get(handler::me))
        .route("/api/auth/logout", post(handler::logout))
}
