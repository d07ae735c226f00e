use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Public Router Module
///
/// Endpoints that are **unauthenticated**. Logout lives here as well: it revokes
/// whatever token it is given and must keep answering 200 for tokens that are
/// already gone.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /ping
        // Liveness check for load balancers; always "pong".
        .route("/ping", get(handlers::ping))
        // GET /status
        // Health marker plus the live session count.
        .route("/status", get(handlers::get_status))
        // POST /login
        // Credential check; issues a bearer token on success.
        .route("/login", post(handlers::login))
        // DELETE /logout
        // Revokes the token from the Authorization header.
        .route("/logout", delete(handlers::logout))
}
