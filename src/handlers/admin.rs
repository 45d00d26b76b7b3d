use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::{
    AppState,
    auth::{ADMINS, AuthUser},
    error::{ApiResult, AppError},
    extract::JsonBody,
    models::{
        AdminOverview, ModerateRequest, Moderation, ModerationAction, ModerationTarget,
        NewModeration,
    },
};

/// get_overview
///
/// [Admin Route] Row counts across the main collections.
#[utoipa::path(
    get,
    path = "/admin/overview",
    responses(
        (status = 200, description = "Counts", body = AdminOverview),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn get_overview(
    user: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<AdminOverview>> {
    user.require_role(ADMINS)?;
    Ok(Json(state.repo.get_overview().await?))
}

/// moderate
///
/// [Admin Route] Records a moderation decision.
///
/// For user targets the action also takes effect: `suspend` deactivates the
/// account (login and existing tokens stop working) and `approve` reactivates it.
#[utoipa::path(
    post,
    path = "/admin/moderate",
    request_body = ModerateRequest,
    responses(
        (status = 201, description = "Moderation recorded", body = Moderation),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Target user not found")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn moderate(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ModerateRequest>,
) -> ApiResult<(StatusCode, Json<Moderation>)> {
    user.require_role(ADMINS)?;
    payload.validate()?;

    if payload.target_type == ModerationTarget::User {
        let found = match payload.action {
            ModerationAction::Suspend => {
                state.repo.set_user_active(payload.target_id, false).await?
            }
            ModerationAction::Approve => {
                state.repo.set_user_active(payload.target_id, true).await?
            }
            ModerationAction::Reject | ModerationAction::Flag => {
                state.repo.get_user(payload.target_id).await?.is_some()
            }
        };
        if !found {
            return Err(AppError::not_found("User not found"));
        }
    }

    let moderation = state
        .repo
        .create_moderation(NewModeration {
            admin_id: user.id,
            target_type: payload.target_type,
            target_id: payload.target_id,
            action: payload.action,
            reason: payload.reason,
        })
        .await?;

    tracing::info!(
        "Admin {} applied {} to {} {}",
        user.id,
        moderation.action,
        moderation.target_type,
        moderation.target_id
    );
    Ok((StatusCode::CREATED, Json(moderation)))
}
