use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    auth::{ATHLETES, AuthUser, EVENT_MANAGERS},
    error::{ApiResult, AppError},
    extract::{JsonBody, Path, Query},
    models::{
        CreateEventRequest, Event, EventDetail, EventListParams, NewEvent, NewNotification,
        NotificationKind, Registration,
    },
    pagination::{PageRequest, Paginated},
};

/// create_event
///
/// [Authenticated Route] Creates an event organized by the caller.
/// The request is rejected unless it ends after it starts.
#[utoipa::path(
    post,
    path = "/events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Caller cannot organize events")
    ),
    security(("bearer_auth" = [])),
    tag = "events"
)]
pub async fn create_event(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateEventRequest>,
) -> ApiResult<(StatusCode, Json<Event>)> {
    user.require_role(EVENT_MANAGERS)?;
    payload.validate()?;

    let event = state
        .repo
        .create_event(NewEvent {
            name: payload.name,
            sport: payload.sport,
            description: payload.description,
            location: payload.location,
            starts_at: payload.starts_at,
            ends_at: payload.ends_at,
            capacity: payload.capacity,
            organizer_id: user.id,
        })
        .await?;

    tracing::info!("Event {} created by {}", event.id, user.id);
    Ok((StatusCode::CREATED, Json(event)))
}

/// list_events
///
/// [Public Route] Events ordered by start time, optionally narrowed to one sport.
#[utoipa::path(
    get,
    path = "/events",
    params(EventListParams),
    responses((status = 200, description = "Events by start time", body = Paginated<Event>)),
    tag = "events"
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<EventListParams>,
) -> ApiResult<Json<Paginated<Event>>> {
    let window = PageRequest::new(params.page, params.page_size)?;
    let (events, total) = state
        .repo
        .list_events(params.sport.as_deref(), window)
        .await?;
    Ok(Json(Paginated::new(events, total, window)))
}

/// get_event
///
/// [Public Route] One event with the ids of everyone registered for it.
#[utoipa::path(
    get,
    path = "/events/{id}",
    params(("id" = Uuid, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event", body = EventDetail),
        (status = 404, description = "Event not found")
    ),
    tag = "events"
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EventDetail>> {
    let event = state
        .repo
        .get_event(id)
        .await?
        .ok_or_else(|| AppError::not_found("Event not found"))?;
    let registered_user_ids = state.repo.get_registered_user_ids(id).await?;

    Ok(Json(EventDetail {
        event,
        registered_user_ids,
    }))
}

/// register_for_event
///
/// [Authenticated Route] Registers the calling athlete.
///
/// *Idempotency*: a repeat call returns the existing registration with 200
/// instead of 201 and creates nothing. The organizer is notified only of new
/// registrations.
#[utoipa::path(
    post,
    path = "/events/{id}/register",
    params(("id" = Uuid, Path, description = "Event id")),
    responses(
        (status = 201, description = "Registered", body = Registration),
        (status = 200, description = "Already registered", body = Registration),
        (status = 403, description = "Caller is not an athlete"),
        (status = 404, description = "Event not found")
    ),
    security(("bearer_auth" = [])),
    tag = "events"
)]
pub async fn register_for_event(
    user: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<Registration>)> {
    user.require_role(ATHLETES)?;

    let event = state
        .repo
        .get_event(event_id)
        .await?
        .ok_or_else(|| AppError::not_found("Event not found"))?;

    let outcome = state
        .repo
        .register_for_event(event.id, user.id, event.capacity)
        .await?;

    if !outcome.created {
        return Ok((StatusCode::OK, Json(outcome.registration)));
    }

    let registration = outcome.registration;
    state
        .repo
        .create_notification(NewNotification {
            user_id: event.organizer_id,
            kind: NotificationKind::EventUpdate,
            title: "New registration".to_string(),
            body: format!(
                "An athlete registered for {} ({})",
                event.name, registration.status
            ),
        })
        .await?;

    tracing::info!(
        "User {} registered for event {} as {}",
        user.id,
        event.id,
        registration.status
    );
    Ok((StatusCode::CREATED, Json(registration)))
}
