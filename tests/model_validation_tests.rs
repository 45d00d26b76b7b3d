use chrono::{Duration, Utc};
use serde_json::json;
use sportex::models::{
    CreateEventRequest, MediaUploadRequest, ModerationTarget, NotificationKind, Privacy,
    RegisterRequest, Role, UpsertProfileRequest,
};
use std::collections::BTreeMap;
use validator::Validate;

#[test]
fn test_register_request_defaults_to_athlete() {
    let req: RegisterRequest = serde_json::from_value(json!({
        "email": "new@sportex.io",
        "password": "password123",
        "name": "New",
    }))
    .unwrap();

    assert_eq!(req.role, Role::Athlete);
    assert!(req.validate().is_ok());
}

#[test]
fn test_register_request_rejects_unknown_role() {
    let parsed = serde_json::from_value::<RegisterRequest>(json!({
        "email": "new@sportex.io",
        "password": "password123",
        "name": "New",
        "role": "superuser",
    }));
    assert!(parsed.is_err());
}

#[test]
fn test_register_request_password_bounds() {
    let mut req = RegisterRequest {
        email: "x@sportex.io".to_string(),
        password: "1234567".to_string(),
        name: "X".to_string(),
        role: Role::Coach,
    };
    assert!(req.validate().is_err());

    req.password = "12345678".to_string();
    assert!(req.validate().is_ok());

    req.password = "x".repeat(129);
    assert!(req.validate().is_err());
}

#[test]
fn test_profile_stats_must_be_named() {
    let req = UpsertProfileRequest {
        sport: "soccer".to_string(),
        stats: BTreeMap::from([(" ".to_string(), 1.0)]),
        ..UpsertProfileRequest::default()
    };
    let errors = req.validate().unwrap_err();
    assert!(errors.field_errors().contains_key("stats"));
}

#[test]
fn test_profile_privacy_defaults_to_public() {
    let req: UpsertProfileRequest = serde_json::from_value(json!({ "sport": "track" })).unwrap();
    assert_eq!(req.privacy, Privacy::Public);
    assert!(req.stats.is_empty());
    assert!(req.validate().is_ok());
}

#[test]
fn test_media_content_type_must_be_image_or_video() {
    let ok = MediaUploadRequest {
        filename: "a.jpg".to_string(),
        content_type: "image/jpeg".to_string(),
    };
    assert!(ok.validate().is_ok());

    let bad = MediaUploadRequest {
        filename: "a.exe".to_string(),
        content_type: "application/octet-stream".to_string(),
    };
    assert!(bad.validate().is_err());
}

#[test]
fn test_event_window_and_capacity() {
    let starts_at = Utc::now();
    let mut req: CreateEventRequest = serde_json::from_value(json!({
        "name": "Camp",
        "sport": "soccer",
        "location": "Dallas, TX",
        "starts_at": starts_at,
        "ends_at": starts_at + Duration::hours(2),
    }))
    .unwrap();
    assert_eq!(req.capacity, 100);
    assert!(req.validate().is_ok());

    req.ends_at = starts_at;
    assert!(req.validate().is_err());

    req.ends_at = starts_at + Duration::hours(2);
    req.capacity = 0;
    assert!(req.validate().is_err());
}

#[test]
fn test_enum_wire_spelling_matches_storage_spelling() {
    assert_eq!(
        serde_json::to_value(NotificationKind::EventUpdate).unwrap(),
        json!(NotificationKind::EventUpdate.as_str())
    );
    assert_eq!(
        serde_json::to_value(ModerationTarget::AthleteProfile).unwrap(),
        json!("athlete_profile")
    );
    assert_eq!("organizer".parse::<Role>().unwrap(), Role::Organizer);
    assert!("coachh".parse::<Role>().is_err());
}
