use std::collections::HashMap;

use crate::{
    error::AppResult,
    models::{Anime, AnimeId},
};

/// Optional decoration stage run after ranking.
///
/// Supplies external mention counts for the final results. The counts are
/// display-only: they never feed back into score or order, and a failing or
/// slow enricher leaves the results undecorated.
#[async_trait::async_trait]
pub trait ResultEnricher: Send + Sync {
    async fn mention_counts(&self, anime: &[Anime]) -> AppResult<HashMap<AnimeId, u32>>;

    fn name(&self) -> &'static str;
}
