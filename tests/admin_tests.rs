mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;
use sportex::AppConfig;
use uuid::Uuid;

#[tokio::test]
async fn test_admin_routes_require_admin_role() {
    let app = TestApp::new();
    let coach = app.register("coach@sportex.io", "coach").await;

    let (status, _) = app.get("/admin/overview", Some(&coach)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/admin/overview", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post(
            "/admin/moderate",
            Some(&coach),
            json!({ "target_type": "team", "target_id": Uuid::new_v4(), "action": "flag" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_overview_counts() {
    let app = TestApp::new();
    let (_, admin) = app.create_admin().await;
    let athlete = app.register("ath@sportex.io", "athlete").await;
    let organizer = app.register("org@sportex.io", "organizer").await;

    app.upsert_profile(&athlete, common::profile_body("soccer", "public", 4.0))
        .await;
    let event_id = app.create_event(&organizer, "soccer", 10).await;
    app.post(&format!("/events/{event_id}/register"), Some(&athlete), json!({}))
        .await;

    let (status, overview) = app.get("/admin/overview", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        overview,
        json!({ "users": 3, "athletes": 1, "teams": 0, "events": 1, "registrations": 1 })
    );
}

#[tokio::test]
async fn test_suspension_blocks_login_and_existing_tokens() {
    let app = TestApp::new();
    let (_, admin) = app.create_admin().await;
    let (athlete_id, athlete) = app.register_with_id("suspect@sportex.io", "athlete").await;
    let login = json!({ "email": "suspect@sportex.io", "password": "password123" });

    let (status, moderation) = app
        .post(
            "/admin/moderate",
            Some(&admin),
            json!({
                "target_type": "user",
                "target_id": athlete_id,
                "action": "suspend",
                "reason": "spam",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(moderation["action"], "suspend");
    assert_eq!(moderation["reason"], "spam");

    let (status, _) = app.get("/me", Some(&athlete)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.post("/auth/login", None, login.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post(
            "/admin/moderate",
            Some(&admin),
            json!({ "target_type": "user", "target_id": athlete_id, "action": "approve" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.post("/auth/login", None, login).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get("/me", Some(&athlete)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_moderating_unknown_user_is_not_found() {
    let app = TestApp::new();
    let (_, admin) = app.create_admin().await;

    let (status, _) = app
        .post(
            "/admin/moderate",
            Some(&admin),
            json!({ "target_type": "user", "target_id": Uuid::new_v4(), "action": "suspend" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Non-user targets are recorded as-is.
    let (status, _) = app
        .post(
            "/admin/moderate",
            Some(&admin),
            json!({ "target_type": "event", "target_id": Uuid::new_v4(), "action": "flag" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

// --- Seed ---

#[tokio::test]
async fn test_seed_populates_once() {
    let app = TestApp::new();

    let (status, seeded) = app.post("/seed", None, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(seeded["message"], "Seeded");
    assert_eq!(seeded["event_ids"].as_array().unwrap().len(), 2);

    let (status, again) = app.post("/seed", None, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["message"], "Already seeded");

    let (status, token) = app
        .post(
            "/auth/login",
            None,
            json!({ "email": "coach@sportex.io", "password": "coach123" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let coach = token["access_token"].as_str().unwrap();
    let (_, dashboard) = app.get("/dashboard/coach", Some(coach)).await;
    assert_eq!(dashboard["teams"][0]["name"], "Austin Hawks");
    assert_eq!(dashboard["teams"][0]["members"].as_array().unwrap().len(), 5);

    let (_, athletes) = app.get("/athletes?page_size=100", None).await;
    assert_eq!(athletes["total"], 10);

    let event_id = seeded["event_ids"][0].as_str().unwrap();
    let (_, event) = app.get(&format!("/events/{event_id}"), None).await;
    assert_eq!(event["name"], "Spring Showcase");
    assert_eq!(event["registered_user_ids"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_seed_can_be_disabled() {
    let app = TestApp::with_config(AppConfig {
        seed_enabled: false,
        ..AppConfig::default()
    });

    let (status, _) = app.post("/seed", None, json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
