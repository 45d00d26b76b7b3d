mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();
    let (status, _) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_twice_is_conflict() {
    let app = TestApp::new();
    let body = json!({ "email": "dup@sportex.io", "password": "password123", "name": "Dup" });

    let (first, _) = app.post("/auth/register", None, body.clone()).await;
    assert_eq!(first, StatusCode::CREATED);

    let (second, error) = app.post("/auth/register", None, body).await;
    assert_eq!(second, StatusCode::CONFLICT);
    assert!(error["error"].is_string());
}

#[tokio::test]
async fn test_register_email_is_case_insensitive() {
    let app = TestApp::new();
    app.register("Case@Sportex.io", "athlete").await;

    let (status, _) = app
        .post(
            "/auth/register",
            None,
            json!({ "email": "case@sportex.io", "password": "password123", "name": "Again" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_as_admin_is_forbidden() {
    let app = TestApp::new();
    let (status, _) = app
        .post(
            "/auth/register",
            None,
            json!({ "email": "boss@sportex.io", "password": "password123", "name": "Boss", "role": "admin" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_register_validation_reports_fields() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/auth/register",
            None,
            json!({ "email": "not-an-email", "password": "short", "name": "X" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    let details = body["details"].as_array().unwrap();
    assert!(details.iter().any(|d| d.as_str().unwrap().starts_with("email")));
    assert!(details.iter().any(|d| d.as_str().unwrap().starts_with("password")));
}

#[tokio::test]
async fn test_register_unknown_role_is_bad_request() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/auth/register",
            None,
            json!({
                "email": "role@sportex.io",
                "password": "password123",
                "name": "Role",
                "role": "superuser"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("superuser"));
}

#[tokio::test]
async fn test_malformed_json_body_is_bad_request() {
    let app = TestApp::new();
    let (status, body) = app.post_raw("/auth/login", "{\"email\": ").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_login_then_me_returns_registered_identity() {
    let app = TestApp::new();
    app.post(
        "/auth/register",
        None,
        json!({ "email": "coach@club.io", "password": "password123", "name": "Carla", "role": "coach" }),
    )
    .await;

    let (status, token) = app
        .post(
            "/auth/login",
            None,
            json!({ "email": "COACH@club.io", "password": "password123" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(token["token_type"], "bearer");

    let access_token = token["access_token"].as_str().unwrap();
    let (status, me) = app.get("/me", Some(access_token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "coach@club.io");
    assert_eq!(me["name"], "Carla");
    assert_eq!(me["role"], "coach");
    assert!(me.get("password_hash").is_none());
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = TestApp::new();
    app.register("runner@sportex.io", "athlete").await;

    let (wrong_password, _) = app
        .post(
            "/auth/login",
            None,
            json!({ "email": "runner@sportex.io", "password": "wrong-password" }),
        )
        .await;
    assert_eq!(wrong_password, StatusCode::UNAUTHORIZED);

    let (unknown_email, _) = app
        .post(
            "/auth/login",
            None,
            json!({ "email": "ghost@sportex.io", "password": "password123" }),
        )
        .await;
    assert_eq!(unknown_email, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_requires_valid_token() {
    let app = TestApp::new();

    let (missing, _) = app.get("/me", None).await;
    assert_eq!(missing, StatusCode::UNAUTHORIZED);

    let (garbage, body) = app.get("/me", Some("not.a.jwt")).await;
    assert_eq!(garbage, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (notifications, _) = app.get("/notifications", None).await;
    assert_eq!(notifications, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_response_carries_request_id() {
    let app = TestApp::new();
    let request = axum::http::Request::builder()
        .uri("/health")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();

    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_incoming_request_id_is_echoed() {
    let app = TestApp::new();
    let request = axum::http::Request::builder()
        .uri("/health")
        .header(sportex::REQUEST_ID_HEADER, "client-chosen-id")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();

    assert_eq!(
        response.headers()[&sportex::REQUEST_ID_HEADER],
        "client-chosen-id"
    );
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = TestApp::new();
    let (status, doc) = app.get("/api-docs/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/auth/register"].is_object());
    assert!(doc["components"]["securitySchemes"]["bearer_auth"].is_object());
}
