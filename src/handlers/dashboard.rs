use axum::{Json, extract::State};

use crate::{
    AppState,
    auth::{AuthUser, DASHBOARD_VIEWERS},
    error::ApiResult,
    models::{CoachDashboard, DashboardEvent},
};

/// coach_dashboard
///
/// [Authenticated Route] The caller's teams and the events they organize,
/// each event carrying its current registration count.
#[utoipa::path(
    get,
    path = "/dashboard/coach",
    responses(
        (status = 200, description = "Dashboard", body = CoachDashboard),
        (status = 403, description = "Caller is not a coach or admin")
    ),
    security(("bearer_auth" = [])),
    tag = "dashboard"
)]
pub async fn coach_dashboard(
    user: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<CoachDashboard>> {
    user.require_role(DASHBOARD_VIEWERS)?;

    let teams = state.repo.get_teams_by_owner(user.id).await?;

    let organized = state.repo.get_events_by_organizer(user.id).await?;
    let mut events = Vec::with_capacity(organized.len());
    for event in organized {
        let registration_count = state.repo.count_registrations(event.id).await?;
        events.push(DashboardEvent {
            event,
            registration_count,
        });
    }

    Ok(Json(CoachDashboard { teams, events }))
}
