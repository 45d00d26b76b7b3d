use axum::{Json, extract::State};
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiResult, AppError},
    extract::Path,
    models::Notification,
};

/// list_notifications
///
/// [Authenticated Route] The caller's notifications, newest first.
#[utoipa::path(
    get,
    path = "/notifications",
    responses((status = 200, description = "Notifications", body = [Notification])),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn list_notifications(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Notification>>> {
    Ok(Json(state.repo.get_notifications(id).await?))
}

/// mark_notification_read
///
/// [Authenticated Route] Marks one notification as read.
///
/// *Ownership*: only the recipient may do this; anyone else gets 403.
#[utoipa::path(
    post,
    path = "/notifications/{id}/read",
    params(("id" = Uuid, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Marked read", body = Notification),
        (status = 403, description = "Not the recipient"),
        (status = 404, description = "Notification not found")
    ),
    security(("bearer_auth" = [])),
    tag = "notifications"
)]
pub async fn mark_notification_read(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Notification>> {
    let notification = state
        .repo
        .get_notification(id)
        .await?
        .ok_or_else(|| AppError::not_found("Notification not found"))?;

    if notification.user_id != user_id {
        return Err(AppError::forbidden("Not your notification"));
    }

    state
        .repo
        .mark_notification_read(id, user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Notification not found"))
}
