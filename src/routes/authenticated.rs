use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Routes that need a signed-in session. The `auth_middleware` layer in
/// `create_router` rejects anonymous callers with 401 before any handler runs.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /session
        // The claims of the caller's bearer token.
        .route("/session", get(handlers::get_session))
}
