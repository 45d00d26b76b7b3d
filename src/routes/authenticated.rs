use crate::{
    AppState,
    handlers::{athletes, auth, dashboard, events, notifications, teams},
};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Every route here sits behind `auth_middleware`, so handlers always receive
/// a validated, active `AuthUser`. Role and ownership checks are done in the
/// handlers against that identity.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        .route("/me", get(auth::get_me))
        // --- Athlete Profiles ---
        // POST /athletes/me
        // Upsert of the caller's own profile (athletes only).
        .route("/athletes/me", post(athletes::upsert_my_profile))
        // POST /athletes/me/media
        // Presigned upload URL for a profile photo or video (10-minute lifetime).
        .route("/athletes/me/media", post(athletes::request_media_upload))
        // GET /athletes/{user_id}
        // Privacy-shaped single profile; private profiles 404 for non-owners.
        .route("/athletes/{user_id}", get(athletes::get_athlete))
        // --- Teams & Events ---
        .route("/teams", post(teams::create_team))
        // POST /teams/{id}/members
        // Owner-only (or admin); idempotent for existing members.
        .route("/teams/{id}/members", post(teams::add_member))
        .route("/events", post(events::create_event))
        // POST /events/{id}/register
        // 201 on a new registration, 200 with the existing record on a repeat.
        .route("/events/{id}/register", post(events::register_for_event))
        .route("/dashboard/coach", get(dashboard::coach_dashboard))
        // --- Notification System ---
        .route("/notifications", get(notifications::list_notifications))
        .route(
            "/notifications/{id}/read",
            post(notifications::mark_notification_read),
        )
}
