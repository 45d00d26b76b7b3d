use axum::{Json, extract::State};

use crate::{
    AppState,
    error::{ApiResult, AppError},
    models::SeedResponse,
    seed::seed_demo_data,
};

/// seed
///
/// [Public Route] Loads the demo roster into an empty store. Disabled unless
/// `SEED_ENABLED` is set (on by default in local mode only).
#[utoipa::path(
    post,
    path = "/seed",
    responses(
        (status = 200, description = "Seeded, or already seeded", body = SeedResponse),
        (status = 403, description = "Seeding disabled")
    ),
    tag = "admin"
)]
pub async fn seed(State(state): State<AppState>) -> ApiResult<Json<SeedResponse>> {
    if !state.config.seed_enabled {
        return Err(AppError::forbidden("Seeding is disabled"));
    }
    let response = seed_demo_data(state.repo.as_ref(), state.config.bcrypt_cost).await?;
    Ok(Json(response))
}
