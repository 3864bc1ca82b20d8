use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints any client may call. Validation never requires a session, and
/// `/navigate` lets the route guards decide what an anonymous caller gets.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /validate/auth
        // Login, password and roles must all be populated.
        .route("/validate/auth", post(handlers::validate_auth))
        // POST /validate/user?rules=email,first_name
        // Ad-hoc rule selection by the caller.
        .route("/validate/user", post(handlers::validate_user))
        // POST /validate/user/{profile}
        // Rule selection from a configured profile.
        .route(
            "/validate/user/{profile}",
            post(handlers::validate_user_profile),
        )
        // GET /navigate?path=main/files
        // Resolves a shell URL to its layouts and lazily loaded feature module.
        .route("/navigate", get(handlers::navigate))
}
