#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use sportex::{
    AppConfig, AppState, InMemoryRepository, MockStorageService, create_router,
    auth::{hash_password, issue_token},
    models::{NewUser, Role},
    repository::Repository,
    storage::StorageState,
};
use std::sync::Arc;
use tower::util::ServiceExt;
use uuid::Uuid;

/// A router over a fresh in-memory store, plus direct handles on the store
/// and config for arranging state the API does not expose (admins, for one).
pub struct TestApp {
    pub router: Router,
    pub repo: Arc<InMemoryRepository>,
    pub config: AppConfig,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(AppConfig::default(), Arc::new(MockStorageService::new()))
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self::build(config, Arc::new(MockStorageService::new()))
    }

    pub fn with_storage(storage: StorageState) -> Self {
        Self::build(AppConfig::default(), storage)
    }

    fn build(config: AppConfig, storage: StorageState) -> Self {
        let repo = Arc::new(InMemoryRepository::new());
        let router = create_router(AppState {
            repo: repo.clone(),
            storage,
            config: config.clone(),
        });
        Self {
            router,
            repo,
            config,
        }
    }

    /// Sends one request through the full router and decodes the JSON body
    /// (`Value::Null` when the body is empty or not JSON).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    /// Sends a prebuilt request, for headers or bodies `request` cannot express.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    /// Posts `raw` verbatim as an `application/json` body.
    pub async fn post_raw(&self, uri: &str, raw: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(raw.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Registers through the API and returns the issued token.
    pub async fn register(&self, email: &str, role: &str) -> String {
        let (status, body) = self
            .post(
                "/auth/register",
                None,
                json!({ "email": email, "password": "password123", "name": "Test User", "role": role }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Registers and returns (user id, token).
    pub async fn register_with_id(&self, email: &str, role: &str) -> (Uuid, String) {
        let token = self.register(email, role).await;
        let id = self.user_id(&token).await;
        (id, token)
    }

    pub async fn user_id(&self, token: &str) -> Uuid {
        let (status, me) = self.get("/me", Some(token)).await;
        assert_eq!(status, StatusCode::OK);
        me["id"].as_str().unwrap().parse().unwrap()
    }

    /// Admins cannot self-register, so they are written straight to the store.
    pub async fn create_admin(&self) -> (Uuid, String) {
        let password_hash = hash_password("admin-password".to_string(), self.config.bcrypt_cost)
            .await
            .unwrap();
        let admin = self
            .repo
            .create_user(NewUser {
                email: format!("admin-{}@sportex.io", Uuid::new_v4()),
                password_hash,
                name: "Admin".to_string(),
                role: Role::Admin,
            })
            .await
            .unwrap();
        let token = issue_token(&self.config, &admin).unwrap();
        (admin.id, token)
    }

    /// Saves an athlete profile for the token's owner.
    pub async fn upsert_profile(&self, token: &str, profile: Value) -> Value {
        let (status, body) = self.post("/athletes/me", Some(token), profile).await;
        assert_eq!(status, StatusCode::OK, "profile upsert failed: {body}");
        body
    }

    /// Creates an event starting tomorrow and returns its id.
    pub async fn create_event(&self, token: &str, sport: &str, capacity: i32) -> Uuid {
        let starts_at = chrono::Utc::now() + chrono::Duration::days(1);
        let ends_at = starts_at + chrono::Duration::hours(2);
        let (status, body) = self
            .post(
                "/events",
                Some(token),
                json!({
                    "name": "Open Tryout",
                    "sport": sport,
                    "location": "Austin, TX",
                    "starts_at": starts_at,
                    "ends_at": ends_at,
                    "capacity": capacity,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "event creation failed: {body}");
        body["id"].as_str().unwrap().parse().unwrap()
    }
}

pub fn profile_body(sport: &str, privacy: &str, ppg: f64) -> Value {
    json!({
        "sport": sport,
        "position": "G",
        "location": "Austin, TX",
        "bio": "Two-way guard",
        "height_cm": 185,
        "stats": { "ppg": ppg, "apg": 4.0 },
        "achievements": ["All-District"],
        "media": [{ "kind": "image", "url": "https://cdn.sportex.io/p.jpg", "thumb": null }],
        "recent_performance": [{ "date": "2025-03-01", "metric": "ppg", "value": ppg }],
        "privacy": privacy,
    })
}
