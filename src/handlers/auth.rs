use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::{
    AppState,
    auth::{AuthUser, hash_password, issue_token, verify_password},
    error::{ApiResult, AppError},
    extract::JsonBody,
    models::{LoginRequest, NewUser, RegisterRequest, Role, TokenResponse, UserProfile},
};

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// register
///
/// [Public Route] Creates an account and returns a bearer token for it.
///
/// *Authorization*: Any role except `admin` may be self-selected; admins are
/// provisioned by seeding or directly in the store.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = TokenResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Admin self-registration"),
        (status = 409, description = "Email already registered")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<TokenResponse>)> {
    payload.validate()?;

    if payload.role == Role::Admin {
        return Err(AppError::forbidden("Admin accounts cannot be self-registered"));
    }

    let password_hash = hash_password(payload.password, state.config.bcrypt_cost).await?;
    let user = state
        .repo
        .create_user(NewUser {
            email: normalize_email(&payload.email),
            password_hash,
            name: payload.name.trim().to_string(),
            role: payload.role,
        })
        .await?;

    tracing::info!("Registered user {} as {}", user.id, user.role);

    let token = issue_token(&state.config, &user)?;
    Ok((StatusCode::CREATED, Json(TokenResponse::bearer(token))))
}

/// login
///
/// [Public Route] Exchanges email and password for a bearer token. Unknown
/// email, wrong password and suspended accounts all yield the same 401.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    payload.validate()?;

    let user = state
        .repo
        .get_user_by_email(&normalize_email(&payload.email))
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(payload.password, user.password_hash.clone()).await? {
        return Err(AppError::Unauthorized);
    }
    if !user.is_active {
        tracing::info!("Login refused for suspended user {}", user.id);
        return Err(AppError::Unauthorized);
    }

    let token = issue_token(&state.config, &user)?;
    Ok(Json(TokenResponse::bearer(token)))
}

/// get_me
///
/// [Authenticated Route] Returns the caller's account without the password hash.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Current user", body = UserProfile),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn get_me(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<UserProfile>> {
    let user = state.repo.get_user(id).await?.ok_or(AppError::Unauthorized)?;
    Ok(Json(user.into()))
}
