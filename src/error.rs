use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    navigation::{ModuleLoadError, NavigationError},
    validation::UnknownUserRule,
};

/// AppError
///
/// Failures a handler can report. Invalid models are not among them: those are
/// answered with a `ValidationResult`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The body is not JSON of the expected shape. Blank or `null` fields are
    /// not this: they deserialize and fail validation instead.
    #[error("Malformed body: {0}")]
    MalformedBody(String),

    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedBody(rejection.body_text())
    }
}

impl From<UnknownUserRule> for AppError {
    fn from(err: UnknownUserRule) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Error response format
#[derive(Debug, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ErrorDetail {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::MalformedBody(_) => (StatusCode::BAD_REQUEST, "MALFORMED_BODY"),
            AppError::Navigation(NavigationError::NoMatch { .. }) => {
                (StatusCode::NOT_FOUND, "NO_ROUTE")
            }
            AppError::Navigation(NavigationError::RedirectLoop { .. }) => {
                (StatusCode::LOOP_DETECTED, "REDIRECT_LOOP")
            }
            // The route table names a module nobody registered: a deployment bug.
            AppError::Navigation(NavigationError::ModuleLoad(ModuleLoadError::UnknownModule(
                _,
            ))) => (StatusCode::INTERNAL_SERVER_ERROR, "MODULE_UNKNOWN"),
            AppError::Navigation(NavigationError::ModuleLoad(ModuleLoadError::Fetch {
                ..
            })) => (StatusCode::BAD_GATEWAY, "MODULE_UNAVAILABLE"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let body = ErrorResponse {
            error: ErrorDetail::new(code, self.to_string()),
        };
        (status, Json(body)).into_response()
    }
}
