use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod privacy;
pub mod repository;
pub mod seed;
pub mod storage;

// Routing segregated by access level (Public, Authenticated, Admin).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{ApiResult, AppError};
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// Aggregates every `#[utoipa::path]` handler and schema into the OpenAPI
/// document served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register, handlers::auth::login, handlers::auth::get_me,
        handlers::athletes::upsert_my_profile, handlers::athletes::search_athletes,
        handlers::athletes::get_athlete, handlers::athletes::request_media_upload,
        handlers::teams::create_team, handlers::teams::get_team, handlers::teams::add_member,
        handlers::events::create_event, handlers::events::list_events,
        handlers::events::get_event, handlers::events::register_for_event,
        handlers::dashboard::coach_dashboard,
        handlers::notifications::list_notifications,
        handlers::notifications::mark_notification_read,
        handlers::admin::get_overview, handlers::admin::moderate,
        handlers::seed::seed,
    ),
    components(
        schemas(
            models::Role, models::Privacy, models::NotificationKind,
            models::RegistrationStatus, models::ModerationTarget, models::ModerationAction,
            models::MediaItem, models::PerformanceSample, models::AthleteProfile,
            models::ProfileView, models::Team, models::Event, models::EventDetail,
            models::Registration, models::Notification, models::Moderation,
            models::RegisterRequest, models::LoginRequest, models::TokenResponse,
            models::UpsertProfileRequest, models::MediaUploadRequest,
            models::MediaUploadResponse, models::CreateTeamRequest, models::AddMemberRequest,
            models::CreateEventRequest, models::ModerateRequest, models::UserProfile,
            models::DashboardEvent, models::CoachDashboard, models::AdminOverview,
            models::SeedResponse,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and the current user"),
        (name = "athletes", description = "Athlete profiles and the athlete directory"),
        (name = "teams", description = "Team rosters"),
        (name = "events", description = "Events and registrations"),
        (name = "dashboard", description = "Coach dashboard"),
        (name = "notifications", description = "Per-user notifications"),
        (name = "admin", description = "Oversight, moderation and seeding"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

/// AppState
///
/// The single shared container of services and configuration, cloned into
/// every request.
#[derive(Clone)]
pub struct AppState {
    /// Persistence: Postgres, or the in-memory store without a DATABASE_URL.
    pub repo: RepositoryState,
    /// Object storage for athlete media uploads.
    pub storage: StorageState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// Correlates a request's log lines and is echoed back on its response.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// auth_middleware
///
/// Guards `authenticated_routes`. Extracting `AuthUser` performs the full
/// token and account check; on failure the extractor's 401 is returned and
/// the handler never runs.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routers, the documentation endpoints, the observability
/// layers and CORS around the given state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .nest("/admin", admin::admin_routes())
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens one span per request carrying method, uri and the `x-request-id`
/// assigned by `SetRequestIdLayer`, so every log line of a request correlates.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
