use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{Anime, AnimeId, Season},
    routes::AppState,
};

const DEFAULT_SEARCH_LIMIT: usize = 10;
const MAX_SEARCH_LIMIT: usize = 25;
const DEFAULT_LISTING_LIMIT: usize = 25;
const MAX_LISTING_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    limit: Option<usize>,
}

impl ListingQuery {
    fn limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_LISTING_LIMIT)
            .min(MAX_LISTING_LIMIT)
    }
}

/// Handler for title search endpoint
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<Anime>>> {
    if params.q.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Search query cannot be empty".to_string(),
        ));
    }

    let limit = params
        .limit
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .min(MAX_SEARCH_LIMIT);
    Ok(Json(state.catalog.search(&params.q, limit).await))
}

/// Handler for the top-ranked listing
pub async fn top(
    State(state): State<AppState>,
    Query(params): Query<ListingQuery>,
) -> Json<Vec<Anime>> {
    Json(state.catalog.top(params.limit()).await)
}

/// Handler for the upcoming listing
pub async fn upcoming(
    State(state): State<AppState>,
    Query(params): Query<ListingQuery>,
) -> Json<Vec<Anime>> {
    Json(state.catalog.upcoming(params.limit()).await)
}

/// Handler for one broadcast season
pub async fn seasonal(
    State(state): State<AppState>,
    Path((year, season)): Path<(i32, String)>,
) -> AppResult<Json<Vec<Anime>>> {
    let season: Season = season.parse().map_err(AppError::InvalidInput)?;
    Ok(Json(state.catalog.seasonal(year, season).await))
}

/// Handler for a single title, served from the metadata cache when fresh
pub async fn by_id(
    State(state): State<AppState>,
    Path(id): Path<AnimeId>,
) -> AppResult<Json<Anime>> {
    state
        .catalog
        .get_by_id(id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Anime {} not found", id)))
}
