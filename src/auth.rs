use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    error::AppError,
    models::{Role, User},
    repository::RepositoryState,
};

// --- Role Sets ---
// Each protected operation names the roles allowed to call it.

pub const ADMINS: &[Role] = &[Role::Admin];
pub const ATHLETES: &[Role] = &[Role::Athlete];
pub const TEAM_MANAGERS: &[Role] = &[Role::Coach, Role::Organizer, Role::Admin];
pub const EVENT_MANAGERS: &[Role] = &[Role::Organizer, Role::Coach, Role::Admin];
pub const DASHBOARD_VIEWERS: &[Role] = &[Role::Coach, Role::Admin];

/// Claims
///
/// The payload signed into every bearer token. Only `sub` is trusted after
/// decoding: the role is re-read from the credential store on each request so
/// a suspended or deleted account loses access immediately.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user's id.
    pub sub: Uuid,
    pub role: Role,
    /// Issued At (iat), seconds since the epoch.
    pub iat: usize,
    /// Expiration Time (exp), seconds since the epoch.
    pub exp: usize,
}

/// issue_token
///
/// Signs an HS256 token for `user` valid for `config.jwt_ttl_seconds`.
pub fn issue_token(config: &AppConfig, user: &User) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let exp = now
        .checked_add(config.jwt_ttl_seconds)
        .ok_or_else(|| AppError::Internal("token expiry overflows".to_string()))?;
    let claims = Claims {
        sub: user.id,
        role: user.role,
        iat: now as usize,
        exp: exp as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("failed to sign token: {e}")))
}

/// decode_token
///
/// Verifies the signature and expiry. Any failure is reported as Unauthorized;
/// the reason is only logged.
pub fn decode_token(config: &AppConfig, token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("rejected bearer token: {:?}", e.kind());
        AppError::Unauthorized
    })
}

/// hash_password
///
/// bcrypt is CPU-bound, so it runs on the blocking pool rather than a runtime worker.
pub async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(|e| AppError::Internal(e.to_string()))
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    // A malformed stored hash is treated as a mismatch.
    Ok(verified.unwrap_or(false))
}

/// bearer_token
///
/// Returns the credentials of an `Authorization` value whose scheme is
/// `Bearer`, compared case-insensitively.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim_start();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// AuthUser Extractor Result
///
/// The resolved identity of an authenticated request. Handlers use it for
/// ownership checks (`id`) and role checks (`require_role`).
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    /// Current role as stored, not as claimed by the token.
    pub role: Role,
}

impl AuthUser {
    /// require_role
    ///
    /// Forbidden unless the caller's role is one of `allowed`.
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::forbidden("Insufficient role for this operation"))
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// AuthUser Extractor Implementation
///
/// 1. Reads `Authorization: Bearer <token>`.
/// 2. Decodes and validates the token (signature and expiry).
/// 3. Loads the user from the credential store; a missing or suspended
///    account is rejected even if the token itself is still valid.
///
/// Rejection: `AppError::Unauthorized` (401) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AppError::Unauthorized)?;

        let claims = decode_token(&config, token)?;

        let user = repo
            .get_user(claims.sub)
            .await?
            .filter(|user| user.is_active)
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthUser {
            id: user.id,
            role: user.role,
        })
    }
}

/// MaybeAuthUser
///
/// Optional identity for endpoints readable anonymously. An absent
/// Authorization header yields `None`; a present but invalid one is still
/// rejected with 401 rather than silently downgraded to anonymous.
#[derive(Debug, Clone, Copy)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(header::AUTHORIZATION) {
            return Ok(MaybeAuthUser(None));
        }
        AuthUser::from_request_parts(parts, state)
            .await
            .map(|user| MaybeAuthUser(Some(user)))
    }
}
