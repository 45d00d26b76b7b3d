use axum::{
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use sportex::{
    AppConfig, AppError, AppState, InMemoryRepository, MockStorageService,
    auth::{AuthUser, Claims, MaybeAuthUser},
    models::{NewUser, Role, User},
    repository::Repository,
};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

const TEST_JWT_SECRET: &str = "extractor-test-secret";

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// Signs a token for `sub` expiring `exp_offset` seconds from now.
fn create_token(sub: Uuid, role: Role, exp_offset: i64, secret: &str) -> String {
    let now = now();
    let claims = Claims {
        sub,
        role,
        iat: now as usize,
        exp: (now + exp_offset) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

async fn state_with_user(role: Role) -> (AppState, Arc<InMemoryRepository>, User) {
    let repo = Arc::new(InMemoryRepository::new());
    let user = repo
        .create_user(NewUser {
            email: "extractor@sportex.io".to_string(),
            password_hash: "unused".to_string(),
            name: "Extractor".to_string(),
            role,
        })
        .await
        .unwrap();

    let config = AppConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    };
    let state = AppState {
        repo: repo.clone(),
        storage: Arc::new(MockStorageService::new()),
        config,
    };
    (state, repo, user)
}

fn get_request_parts(authorization: Option<String>) -> Parts {
    let mut builder = Request::builder()
        .method(Method::GET)
        .uri("/".parse::<Uri>().unwrap());
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    let (parts, _) = builder.body(axum::body::Body::empty()).unwrap().into_parts();
    parts
}

fn assert_unauthorized(result: Result<AuthUser, AppError>) {
    match result {
        Err(err) => assert_eq!(err.status(), StatusCode::UNAUTHORIZED),
        Ok(user) => panic!("expected rejection, got {user:?}"),
    }
}

#[tokio::test]
async fn test_auth_success_with_valid_jwt() {
    let (state, _, user) = state_with_user(Role::Organizer).await;
    let token = create_token(user.id, Role::Organizer, 3600, TEST_JWT_SECRET);
    let mut parts = get_request_parts(Some(format!("Bearer {token}")));

    let auth_user = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap();

    assert_eq!(auth_user.id, user.id);
    assert_eq!(auth_user.role, Role::Organizer);
}

#[tokio::test]
async fn test_role_comes_from_store_not_token() {
    let (state, _, user) = state_with_user(Role::Athlete).await;
    // Token claims admin, the stored account is an athlete.
    let token = create_token(user.id, Role::Admin, 3600, TEST_JWT_SECRET);
    let mut parts = get_request_parts(Some(format!("Bearer {token}")));

    let auth_user = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap();
    assert_eq!(auth_user.role, Role::Athlete);
}

#[tokio::test]
async fn test_auth_failure_with_missing_header() {
    let (state, _, _) = state_with_user(Role::Athlete).await;
    let mut parts = get_request_parts(None);
    assert_unauthorized(AuthUser::from_request_parts(&mut parts, &state).await);
}

#[tokio::test]
async fn test_auth_failure_without_bearer_prefix() {
    let (state, _, user) = state_with_user(Role::Athlete).await;
    let token = create_token(user.id, Role::Athlete, 3600, TEST_JWT_SECRET);
    let mut parts = get_request_parts(Some(format!("Token {token}")));
    assert_unauthorized(AuthUser::from_request_parts(&mut parts, &state).await);
}

#[tokio::test]
async fn test_auth_accepts_lowercase_scheme() {
    let (state, _, user) = state_with_user(Role::Athlete).await;
    let token = create_token(user.id, Role::Athlete, 3600, TEST_JWT_SECRET);
    let mut parts = get_request_parts(Some(format!("bearer {token}")));

    let auth_user = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap();
    assert_eq!(auth_user.id, user.id);
}

#[tokio::test]
async fn test_auth_failure_with_expired_jwt() {
    let (state, _, user) = state_with_user(Role::Athlete).await;
    // Well past the default validation leeway.
    let token = create_token(user.id, Role::Athlete, -3600, TEST_JWT_SECRET);
    let mut parts = get_request_parts(Some(format!("Bearer {token}")));
    assert_unauthorized(AuthUser::from_request_parts(&mut parts, &state).await);
}

#[tokio::test]
async fn test_auth_failure_with_wrong_secret() {
    let (state, _, user) = state_with_user(Role::Athlete).await;
    let token = create_token(user.id, Role::Athlete, 3600, "a-different-secret");
    let mut parts = get_request_parts(Some(format!("Bearer {token}")));
    assert_unauthorized(AuthUser::from_request_parts(&mut parts, &state).await);
}

#[tokio::test]
async fn test_auth_failure_for_unknown_or_suspended_user() {
    let (state, repo, user) = state_with_user(Role::Athlete).await;

    let stranger = create_token(Uuid::new_v4(), Role::Athlete, 3600, TEST_JWT_SECRET);
    let mut parts = get_request_parts(Some(format!("Bearer {stranger}")));
    assert_unauthorized(AuthUser::from_request_parts(&mut parts, &state).await);

    repo.set_user_active(user.id, false).await.unwrap();
    let token = create_token(user.id, Role::Athlete, 3600, TEST_JWT_SECRET);
    let mut parts = get_request_parts(Some(format!("Bearer {token}")));
    assert_unauthorized(AuthUser::from_request_parts(&mut parts, &state).await);
}

#[tokio::test]
async fn test_optional_auth_distinguishes_absent_from_invalid() {
    let (state, _, user) = state_with_user(Role::Coach).await;

    let mut anonymous = get_request_parts(None);
    let MaybeAuthUser(viewer) = MaybeAuthUser::from_request_parts(&mut anonymous, &state)
        .await
        .unwrap();
    assert!(viewer.is_none());

    let token = create_token(user.id, Role::Coach, 3600, TEST_JWT_SECRET);
    let mut signed_in = get_request_parts(Some(format!("Bearer {token}")));
    let MaybeAuthUser(viewer) = MaybeAuthUser::from_request_parts(&mut signed_in, &state)
        .await
        .unwrap();
    assert_eq!(viewer.map(|v| v.id), Some(user.id));

    let mut invalid = get_request_parts(Some("Bearer garbage".to_string()));
    let rejected = MaybeAuthUser::from_request_parts(&mut invalid, &state).await;
    assert!(matches!(rejected, Err(AppError::Unauthorized)));
}
