/// Anime catalog provider abstraction
///
/// A provider is the raw transport to an upstream catalog. It reports failures
/// as `AppError`; turning those into absent/empty results is the job of
/// [`Catalog`](crate::services::catalog::Catalog), which sits in front of it.
use crate::{
    error::AppResult,
    models::{Anime, AnimeId, Season},
};

pub mod jikan;

pub use jikan::{JikanProvider, ProviderSettings};

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Full record for one title, `None` when the upstream does not know the id
    async fn fetch_by_id(&self, id: AnimeId) -> AppResult<Option<Anime>>;

    /// Free-text search returning at most `limit` titles
    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<Anime>>;

    /// Globally ranked titles, best first
    async fn fetch_top(&self, limit: usize) -> AppResult<Vec<Anime>>;

    /// Announced titles that have not started airing
    async fn fetch_upcoming(&self, limit: usize) -> AppResult<Vec<Anime>>;

    /// Titles airing in one broadcast season
    async fn fetch_seasonal(&self, year: i32, season: Season) -> AppResult<Vec<Anime>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Drops repeated ids, keeping the first occurrence
pub(crate) fn dedup_by_id(anime: Vec<Anime>) -> Vec<Anime> {
    let mut seen = std::collections::HashSet::new();
    anime.into_iter().filter(|a| seen.insert(a.id)).collect()
}
