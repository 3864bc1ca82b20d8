use crate::{
    AppState,
    auth::{Claims, Session, SignedIn},
    config::AppConfig,
    error::AppError,
    models::{AuthModel, UserModel},
    navigation::Resolution,
    validation::{AuthModelValidator, UserModelValidator, UserRuleSet, ValidationResult, Validator},
};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;

// --- Query Structs ---

/// RulesQuery
///
/// Rule selection for ad-hoc user validation (POST /validate/user).
#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RulesQuery {
    /// Comma separated rule names, e.g. `email,first_name,auth`. Absent means no rules.
    #[serde(default)]
    pub rules: String,
}

/// NavigateQuery
///
/// The client URL to resolve (GET /navigate).
#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NavigateQuery {
    /// Path inside the application shell, e.g. `main/files`. Absent means the root.
    #[serde(default)]
    pub path: String,
}

/// Status code for a finished validation: 200 when valid, 422 otherwise.
fn validation_response(result: ValidationResult) -> (StatusCode, Json<ValidationResult>) {
    if result.is_valid {
        (StatusCode::OK, Json(result))
    } else {
        tracing::debug!(failures = result.errors.len(), "model rejected");
        (StatusCode::UNPROCESSABLE_ENTITY, Json(result))
    }
}

// --- Handlers ---

/// validate_auth
///
/// [Public Route] Checks credentials and roles of an `AuthModel`.
#[utoipa::path(
    post,
    path = "/validate/auth",
    request_body = AuthModel,
    responses(
        (status = 200, description = "Valid", body = ValidationResult),
        (status = 422, description = "Invalid", body = ValidationResult),
        (status = 400, description = "Malformed body", body = crate::error::ErrorResponse)
    )
)]
pub async fn validate_auth(
    payload: Result<Json<AuthModel>, JsonRejection>,
) -> Result<(StatusCode, Json<ValidationResult>), AppError> {
    let Json(model) = payload?;
    Ok(validation_response(AuthModelValidator.validate(&model)))
}

/// validate_user
///
/// [Public Route] Validates a `UserModel` against the rules named in the query
/// string. Unknown rule names are a 400.
#[utoipa::path(
    post,
    path = "/validate/user",
    params(RulesQuery),
    request_body = UserModel,
    responses(
        (status = 200, description = "Valid", body = ValidationResult),
        (status = 422, description = "Invalid", body = ValidationResult),
        (status = 400, description = "Unknown rule or malformed body", body = crate::error::ErrorResponse)
    )
)]
pub async fn validate_user(
    Query(query): Query<RulesQuery>,
    payload: Result<Json<UserModel>, JsonRejection>,
) -> Result<(StatusCode, Json<ValidationResult>), AppError> {
    let rules: UserRuleSet = query.rules.parse()?;
    let Json(model) = payload?;
    let validator = UserModelValidator::new(rules);
    Ok(validation_response(validator.validate(&model)))
}

/// validate_user_profile
///
/// [Public Route] Validates a `UserModel` with the rule set configured under
/// `profile` (see `USER_RULE_PROFILES`).
#[utoipa::path(
    post,
    path = "/validate/user/{profile}",
    params(("profile" = String, Path, description = "Configured rule profile")),
    request_body = UserModel,
    responses(
        (status = 200, description = "Valid", body = ValidationResult),
        (status = 422, description = "Invalid", body = ValidationResult),
        (status = 404, description = "Unknown profile", body = crate::error::ErrorResponse),
        (status = 400, description = "Malformed body", body = crate::error::ErrorResponse)
    )
)]
pub async fn validate_user_profile(
    State(config): State<AppConfig>,
    Path(profile): Path<String>,
    payload: Result<Json<UserModel>, JsonRejection>,
) -> Result<(StatusCode, Json<ValidationResult>), AppError> {
    let rules = config
        .user_rule_profile(&profile)
        .ok_or_else(|| AppError::NotFound(format!("validation profile '{profile}'")))?;
    let Json(model) = payload?;

    tracing::debug!(%profile, %rules, "validating user");
    let validator = UserModelValidator::new(rules.clone());
    Ok(validation_response(validator.validate(&model)))
}

/// navigate
///
/// [Public Route] Resolves a shell URL for the caller's session. Guarded subtrees
/// redirect anonymous callers; the response lists the redirects taken.
#[utoipa::path(
    get,
    path = "/navigate",
    params(NavigateQuery),
    responses(
        (status = 200, description = "Resolved", body = Resolution),
        (status = 404, description = "No route", body = crate::error::ErrorResponse),
        (status = 502, description = "Module unavailable", body = crate::error::ErrorResponse)
    )
)]
pub async fn navigate(
    session: Session,
    State(state): State<AppState>,
    Query(query): Query<NavigateQuery>,
) -> Result<Json<Resolution>, AppError> {
    let resolution = state.navigator.resolve(&query.path, &session).await?;
    Ok(Json(resolution))
}

/// get_session
///
/// [Authenticated Route] Returns the claims of the signed-in caller.
#[utoipa::path(
    get,
    path = "/session",
    responses(
        (status = 200, description = "Current session", body = Claims),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn get_session(SignedIn(claims): SignedIn) -> Json<Claims> {
    Json(claims)
}
