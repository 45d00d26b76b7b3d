use crate::{AppState, handlers::admin};
use axum::{
    Router,
    routing::{get, post},
};

/// Admin Router Module
///
/// Nested under `/admin`. Each handler authenticates through the `AuthUser`
/// extractor and then requires the admin role before touching the store.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/overview
        // Counts of users, athlete profiles, teams, events and registrations.
        .route("/overview", get(admin::get_overview))
        // POST /admin/moderate
        // Records a moderation action; `suspend`/`approve` on a user toggles the account.
        .route("/moderate", post(admin::moderate))
}
