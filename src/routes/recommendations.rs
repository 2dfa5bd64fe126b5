use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{AnimeId, RecommendationResult, UserPreferences},
    routes::AppState,
};

/// Most seeds a caller may send (a user's top five)
pub const MAX_SEEDS: usize = 5;
const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub seed_ids: Vec<AnimeId>,
    #[serde(default)]
    pub preferences: UserPreferences,
    #[serde(default)]
    pub limit: Option<usize>,
    /// Requesting user, whose own saved lists are left out of co-occurrence
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<Vec<RecommendationResult>>> {
    if request.seed_ids.len() > MAX_SEEDS {
        return Err(AppError::InvalidInput(format!(
            "At most {} seed titles are allowed, got {}",
            MAX_SEEDS,
            request.seed_ids.len()
        )));
    }

    let limit = request.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);

    tracing::info!(
        request_id = %request_id,
        seeds = request.seed_ids.len(),
        limit,
        "Processing recommendation request"
    );

    let results = state
        .engine
        .get_recommendations_for_user(
            &request.seed_ids,
            &request.preferences,
            limit,
            request.user_id,
        )
        .await;

    tracing::info!(
        request_id = %request_id,
        returned = results.len(),
        "Recommendations served"
    );

    Ok(Json(results))
}
