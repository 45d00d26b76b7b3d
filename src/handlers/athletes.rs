use axum::{Json, extract::State};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    auth::{ATHLETES, AuthUser, MaybeAuthUser},
    error::{ApiResult, AppError},
    extract::{JsonBody, Path, Query},
    models::{
        AthleteProfile, MediaUploadRequest, MediaUploadResponse, ProfileSearchParams,
        ProfileView, UpsertProfileRequest,
    },
    pagination::{PageRequest, Paginated},
    privacy,
    repository::ProfileSearch,
    storage::media_object_key,
};

/// upsert_my_profile
///
/// [Authenticated Route] Creates or replaces the caller's athlete profile.
///
/// *Ownership*: the profile is always keyed by the caller's id, so no other
/// profile can be written through this endpoint.
#[utoipa::path(
    post,
    path = "/athletes/me",
    request_body = UpsertProfileRequest,
    responses(
        (status = 200, description = "Profile saved", body = AthleteProfile),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Caller is not an athlete")
    ),
    security(("bearer_auth" = [])),
    tag = "athletes"
)]
pub async fn upsert_my_profile(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<UpsertProfileRequest>,
) -> ApiResult<Json<AthleteProfile>> {
    user.require_role(ATHLETES)?;
    payload.validate()?;

    let profile = AthleteProfile {
        user_id: user.id,
        sport: payload.sport,
        position: payload.position,
        location: payload.location,
        bio: payload.bio,
        height_cm: payload.height_cm,
        weight_kg: payload.weight_kg,
        stats: payload.stats,
        achievements: payload.achievements,
        media: payload.media,
        recent_performance: payload.recent_performance,
        privacy: payload.privacy,
        updated_at: Utc::now(),
    };

    let saved = state.repo.upsert_profile(profile).await?;
    tracing::info!("Profile saved for athlete {} ({})", saved.user_id, saved.privacy);
    Ok(Json(saved))
}

/// search_athletes
///
/// [Public Route] Filtered, paginated athlete directory. Authentication is
/// optional; it only widens what the caller sees of limited profiles.
/// Private profiles never appear here.
#[utoipa::path(
    get,
    path = "/athletes",
    params(ProfileSearchParams),
    responses(
        (status = 200, description = "Matching profiles", body = Paginated<ProfileView>),
        (status = 400, description = "Invalid filter combination or paging")
    ),
    tag = "athletes"
)]
pub async fn search_athletes(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Query(params): Query<ProfileSearchParams>,
) -> ApiResult<Json<Paginated<ProfileView>>> {
    let min_stat = match (params.min_stat_key, params.min_stat_value) {
        (Some(key), Some(value)) => Some((key, value)),
        (None, None) => None,
        _ => {
            return Err(AppError::InvalidInput(
                "min_stat_key and min_stat_value must be provided together".to_string(),
            ));
        }
    };
    let window = PageRequest::new(params.page, params.page_size)?;

    let search = ProfileSearch {
        sport: params.sport,
        position: params.position,
        location: params.location,
        min_stat,
        window,
    };
    let (profiles, total) = state.repo.search_profiles(&search).await?;

    let views = profiles
        .into_iter()
        .filter_map(|profile| privacy::present(profile, viewer.as_ref()))
        .collect();

    Ok(Json(Paginated::new(views, total, window)))
}

/// get_athlete
///
/// [Authenticated Route] A single profile, shaped by the privacy policy.
/// A private profile is reported as missing to anyone but its owner and admins.
#[utoipa::path(
    get,
    path = "/athletes/{user_id}",
    params(("user_id" = Uuid, Path, description = "Athlete's user id")),
    responses(
        (status = 200, description = "Profile", body = ProfileView),
        (status = 404, description = "Profile not found")
    ),
    security(("bearer_auth" = [])),
    tag = "athletes"
)]
pub async fn get_athlete(
    viewer: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<ProfileView>> {
    state
        .repo
        .get_profile(user_id)
        .await?
        .and_then(|profile| privacy::present(profile, Some(&viewer)))
        .map(Json)
        .ok_or_else(|| AppError::not_found("Profile not found"))
}

/// request_media_upload
///
/// [Authenticated Route] Issues a short-lived presigned PUT URL for a profile
/// photo or video. The client uploads directly to object storage and then
/// references `resource_key` in its profile's `media` list.
#[utoipa::path(
    post,
    path = "/athletes/me/media",
    request_body = MediaUploadRequest,
    responses(
        (status = 200, description = "Upload URL issued", body = MediaUploadResponse),
        (status = 400, description = "Unsupported content type"),
        (status = 403, description = "Caller is not an athlete")
    ),
    security(("bearer_auth" = [])),
    tag = "athletes"
)]
pub async fn request_media_upload(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<MediaUploadRequest>,
) -> ApiResult<Json<MediaUploadResponse>> {
    user.require_role(ATHLETES)?;
    payload.validate()?;

    let resource_key = media_object_key(user.id, &payload.filename);
    let upload_url = state
        .storage
        .presign_upload(&resource_key, &payload.content_type)
        .await?;

    Ok(Json(MediaUploadResponse {
        upload_url,
        resource_key,
    }))
}
