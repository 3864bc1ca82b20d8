use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    config::{AppConfig, Env},
    models::Role,
};

/// Header accepted in `Env::Local` to sign in without a token.
pub const DEV_LOGIN_HEADER: &str = "x-dev-login";

/// Claims
///
/// Payload of the bearer token issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Claims {
    /// Subject (sub): the login of the signed-in account.
    pub sub: String,
    #[serde(default)]
    pub roles: Vec<Role>,
    /// Expiration Time (exp), seconds since the epoch.
    #[ts(type = "number")]
    pub exp: usize,
    /// Issued At (iat), seconds since the epoch.
    #[ts(type = "number")]
    pub iat: usize,
}

/// Session
///
/// The caller's sign-in state as seen by guards and handlers. Anonymous when no
/// valid token was presented.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    claims: Option<Claims>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(claims: Claims) -> Self {
        Self {
            claims: Some(claims),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.claims.is_some()
    }

    pub fn claims(&self) -> Option<&Claims> {
        self.claims.as_ref()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.claims
            .as_ref()
            .is_some_and(|claims| claims.roles.contains(&role))
    }
}

/// decode_token
///
/// Validates signature and expiry of `token` against `secret`.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(token, &decoding_key, &validation).map(|data| data.claims)
}

/// Resolves the session carried by a request.
///
/// 1. Local bypass: in `Env::Local` the `x-dev-login` header signs the caller in
///    as that login with the `User` role.
/// 2. Bearer token: decoded and validated with the configured secret.
///
/// Anything else (no header, malformed header, expired or forged token) yields an
/// anonymous session.
fn session_from_parts(parts: &Parts, config: &AppConfig) -> Session {
    if config.env == Env::Local {
        if let Some(login) = parts
            .headers
            .get(DEV_LOGIN_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|login| !login.trim().is_empty())
        {
            return Session::signed_in(Claims {
                sub: login.to_string(),
                roles: vec![Role::User],
                exp: usize::MAX,
                iat: 0,
            });
        }
    }

    let Some(token) = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
    else {
        return Session::anonymous();
    };

    match decode_token(token, &config.jwt_secret) {
        Ok(claims) => Session::signed_in(claims),
        Err(e) => {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("bearer token expired"),
                kind => tracing::debug!(?kind, "bearer token rejected"),
            }
            Session::anonymous()
        }
    }
}

/// Session Extractor Implementation
///
/// Never rejects: public routes (navigation in particular) must work for
/// anonymous callers and let guards decide.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);
        Ok(session_from_parts(parts, &config))
    }
}

/// SignedIn
///
/// Extractor for routes that require a signed-in caller. Rejects with
/// `401 Unauthorized` when the session is anonymous.
#[derive(Debug, Clone)]
pub struct SignedIn(pub Claims);

impl<S> FromRequestParts<S> for SignedIn
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);
        session_from_parts(parts, &config)
            .claims
            .map(SignedIn)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}
