use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core layers: request models, their validators and the shell navigation.
pub mod models;
pub mod navigation;
pub mod validation;

// HTTP plumbing.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;

// Module for routing segregation (Public, Authenticated).
pub mod routes;
use auth::SignedIn;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::AppError;
pub use navigation::{ModuleRegistry, Navigator, SignedInGuard, app_routes};

/// ApiDoc
///
/// OpenAPI document for every handler and schema, served at
/// `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::validate_auth, handlers::validate_user, handlers::validate_user_profile,
        handlers::navigate, handlers::get_session
    ),
    components(
        schemas(
            models::AuthModel, models::UserModel, models::SignInModel, models::Role,
            validation::ValidationResult, validation::ValidationFailure, validation::UserRule,
            navigation::Resolution, navigation::Redirect, navigation::RedirectCause,
            navigation::ModuleHandle, auth::Claims, error::ErrorResponse, error::ErrorDetail,
        )
    ),
    tags(
        (name = "architecture-portal", description = "Validation and shell navigation API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, immutable application state: the configuration and the navigator
/// (which owns the lazily filled module cache).
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub navigator: Arc<Navigator>,
}

impl AppState {
    /// The application shell: `app_routes` guarded by `SignedInGuard`, backed
    /// by the built-in feature modules.
    pub fn new(config: AppConfig) -> Self {
        let table = app_routes(Arc::new(SignedInGuard::default()));
        let navigator = Navigator::new(table, Arc::new(ModuleRegistry::builtin()));

        Self {
            config,
            navigator: Arc::new(navigator),
        }
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Requires a signed-in session for the `authenticated_routes`. The `SignedIn`
/// extractor rejects anonymous requests with 401 before `next` runs.
async fn auth_middleware(_signed_in: SignedIn, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing structure, applies global and scoped middleware, and
/// registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Swagger UI over the generated OpenAPI document.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public Routes: validation, navigation and health. Navigation reads the
        // session itself and lets the shell's guards decide.
        .merge(public::public_routes())
        // Authenticated Routes: anonymous callers get a 401 from `auth_middleware`.
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .with_state(state);

    // 3. Observability and Correlation Layers (outermost, run first)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID: a UUID per incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Tracing: one span per request, tagged by `trace_span_logger`.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Propagation: echo the x-request-id header back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with the `x-request-id` set by
/// `SetRequestIdLayer` so every log line of a request correlates.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
