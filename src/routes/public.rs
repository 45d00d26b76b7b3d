use crate::{
    AppState,
    handlers::{athletes, auth, events, seed, teams},
};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a token. `GET /athletes` still accepts an
/// optional bearer token, which only changes how limited profiles are shaped.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers and compose health checks.
        .route("/health", get(|| async { "ok" }))
        // POST /auth/register, POST /auth/login
        // Both return `{access_token, token_type}`.
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // GET /athletes?sport=&position=&location=&min_stat_key=&min_stat_value=&page=&page_size=
        // Private profiles are excluded by the repository query itself.
        .route("/athletes", get(athletes::search_athletes))
        .route("/teams/{id}", get(teams::get_team))
        .route("/events", get(events::list_events))
        .route("/events/{id}", get(events::get_event))
        // POST /seed
        // Gated by `AppConfig::seed_enabled` inside the handler.
        .route("/seed", post(seed::seed))
}
