use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mongodb::bson::Document;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    config::AppConfig,
    error::{AppError, Result},
    repository::RepositoryState,
};

/// Lifetime of every issued token. There is no refresh or revocation.
pub const TOKEN_LIFETIME_DAYS: i64 = 365;

/// Claims
///
/// The payload of a bearer token: whatever object the client sent to POST /jwt
/// (normally `{ "email": ... }`) plus the registered `iat` and `exp` claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub payload: Map<String, Value>,
    /// Issued At, seconds since the epoch.
    pub iat: i64,
    /// Expiration Time, seconds since the epoch. Checked on every request.
    pub exp: i64,
}

impl Claims {
    /// Wraps a client payload, stamping it with a fresh `iat`/`exp` pair. Client-supplied
    /// `iat`/`exp` keys are discarded so they cannot extend the lifetime.
    pub fn new(mut payload: Map<String, Value>) -> Self {
        payload.remove("iat");
        payload.remove("exp");
        let now = Utc::now();
        Self {
            payload,
            iat: now.timestamp(),
            exp: (now + Duration::days(TOKEN_LIFETIME_DAYS)).timestamp(),
        }
    }

    pub fn email(&self) -> Option<&str> {
        self.payload.get("email").and_then(Value::as_str)
    }
}

/// issue_token
///
/// Signs `payload` with the configured secret (HS256).
pub fn issue_token(secret: &str, payload: Map<String, Value>) -> Result<String> {
    let claims = Claims::new(payload);
    let key = EncodingKey::from_secret(secret.as_bytes());
    Ok(encode(&Header::default(), &claims, &key)?)
}

/// verify_token
///
/// Checks signature and expiry, returning the decoded claims. Every failure kind
/// (bad signature, malformed token, expired) collapses to `Unauthorized`.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;
    // The payload is caller-chosen, so an `aud` key is just data.
    validation.validate_aud = false;

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            AppError::Unauthorized
        })
}

/// AuthUser
///
/// The resolved identity of an authenticated request: the decoded token claims.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub claims: Claims,
}

impl AuthUser {
    pub fn email(&self) -> Option<&str> {
        self.claims.email()
    }
}

/// AuthUser Extractor Implementation
///
/// Resolution order:
/// 1. Claims already attached to the request by `require_token`.
/// 2. The `Authorization: Bearer <token>` header, verified against `AppConfig::token_secret`.
///
/// Rejection: `AppError::Unauthorized` (401) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let config = AppConfig::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AppError::Unauthorized)?;

        let claims = verify_token(&config.token_secret, token)?;
        Ok(AuthUser { claims })
    }
}

/// require_token
///
/// Route layer for every token-protected route. Extracting `AuthUser` rejects the
/// request with 401 before the handler runs; on success the claims are stored in the
/// request extensions for the admin check and the handler.
pub async fn require_token(auth_user: AuthUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(auth_user);
    next.run(request).await
}

/// require_admin
///
/// Route layer for admin-only routes, installed inside `require_token`. Looks up the
/// stored user by the token's email and rejects with 403 unless its role is "admin".
pub async fn require_admin(
    State(repo): State<RepositoryState>,
    auth_user: AuthUser,
    request: Request,
    next: Next,
) -> Result<Response> {
    let email = auth_user.email().ok_or(AppError::Forbidden)?;
    let user = repo.find_user_by_email(email).await?;

    if !user.as_ref().is_some_and(is_admin) {
        tracing::warn!(email, "admin route refused");
        return Err(AppError::Forbidden);
    }

    Ok(next.run(request).await)
}

/// True when a stored user document carries `role: "admin"`.
pub fn is_admin(user: &Document) -> bool {
    matches!(user.get_str("role"), Ok("admin"))
}
