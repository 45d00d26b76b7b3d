use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    auth::{AuthUser, TEAM_MANAGERS},
    error::{ApiResult, AppError},
    extract::{JsonBody, Path},
    models::{AddMemberRequest, CreateTeamRequest, NewNotification, NewTeam, NotificationKind, Team},
};

/// create_team
///
/// [Authenticated Route] Creates a team owned by the caller.
#[utoipa::path(
    post,
    path = "/teams",
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = Team),
        (status = 403, description = "Caller cannot manage teams")
    ),
    security(("bearer_auth" = [])),
    tag = "teams"
)]
pub async fn create_team(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateTeamRequest>,
) -> ApiResult<(StatusCode, Json<Team>)> {
    user.require_role(TEAM_MANAGERS)?;
    payload.validate()?;

    let team = state
        .repo
        .create_team(NewTeam {
            name: payload.name,
            sport: payload.sport,
            location: payload.location,
            owner_id: user.id,
        })
        .await?;

    tracing::info!("Team {} created by {}", team.id, user.id);
    Ok((StatusCode::CREATED, Json(team)))
}

/// get_team
///
/// [Public Route] A team with its member ids.
#[utoipa::path(
    get,
    path = "/teams/{id}",
    params(("id" = Uuid, Path, description = "Team id")),
    responses(
        (status = 200, description = "Team", body = Team),
        (status = 404, description = "Team not found")
    ),
    tag = "teams"
)]
pub async fn get_team(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Team>> {
    state
        .repo
        .get_team(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Team not found"))
}

/// add_member
///
/// [Authenticated Route] Adds a user to a team's roster.
///
/// *RBAC/Ownership*: team managers only, and non-admins only on teams they own.
/// Adding an existing member changes nothing; a new member gets an invite
/// notification.
#[utoipa::path(
    post,
    path = "/teams/{id}/members",
    params(("id" = Uuid, Path, description = "Team id")),
    request_body = AddMemberRequest,
    responses(
        (status = 200, description = "Updated team", body = Team),
        (status = 403, description = "Not the team owner"),
        (status = 404, description = "Team or user not found")
    ),
    security(("bearer_auth" = [])),
    tag = "teams"
)]
pub async fn add_member(
    user: AuthUser,
    State(state): State<AppState>,
    Path(team_id): Path<Uuid>,
    JsonBody(payload): JsonBody<AddMemberRequest>,
) -> ApiResult<Json<Team>> {
    user.require_role(TEAM_MANAGERS)?;

    let team = state
        .repo
        .get_team(team_id)
        .await?
        .ok_or_else(|| AppError::not_found("Team not found"))?;

    if !user.is_admin() && team.owner_id != user.id {
        return Err(AppError::forbidden("Only the team owner can add members"));
    }

    if state.repo.get_user(payload.user_id).await?.is_none() {
        return Err(AppError::not_found("User not found"));
    }

    let added = state.repo.add_team_member(team_id, payload.user_id).await?;
    if added {
        state
            .repo
            .create_notification(NewNotification {
                user_id: payload.user_id,
                kind: NotificationKind::Invite,
                title: "Team invitation".to_string(),
                body: format!("You have been added to {}", team.name),
            })
            .await?;
        tracing::info!("User {} added to team {}", payload.user_id, team_id);
    }

    let team = state
        .repo
        .get_team(team_id)
        .await?
        .ok_or_else(|| AppError::not_found("Team not found"))?;
    Ok(Json(team))
}
