use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::{
    error::AppResult,
    models::{Anime, AnimeId, AnimeImages, AnimeType},
};

/// Records older than this many days are refetched on read
pub const DEFAULT_FRESHNESS_DAYS: i64 = 7;

/// Durable per-title metadata cache keyed by anime id
///
/// `put` replaces any existing record with the same id and stamps it with the
/// current time. Records are never deleted, only replaced on refresh.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataStore: Send + Sync {
    async fn get(&self, id: AnimeId) -> AppResult<Option<Anime>>;

    async fn put(&self, anime: &Anime) -> AppResult<()>;
}

/// True iff the record was cached strictly less than `threshold_days` before `now`
pub fn is_fresh(anime: &Anime, now: DateTime<Utc>, threshold_days: i64) -> bool {
    match anime.cached_at {
        Some(cached_at) => now - cached_at < Duration::days(threshold_days),
        None => false,
    }
}

// ============================================================================
// PostgreSQL
// ============================================================================

#[derive(Debug, sqlx::FromRow)]
struct AnimeCacheRow {
    anime_id: i64,
    title: String,
    title_english: Option<String>,
    image_url: Option<String>,
    large_image_url: Option<String>,
    year: Option<i32>,
    season: Option<String>,
    anime_type: Option<String>,
    episodes: Option<i32>,
    score: Option<f64>,
    popularity: Option<i32>,
    genres: Vec<String>,
    studios: Vec<String>,
    demographics: Vec<String>,
    synopsis: Option<String>,
    status: Option<String>,
    source: Option<String>,
    rating: Option<String>,
    cached_at: DateTime<Utc>,
}

impl From<AnimeCacheRow> for Anime {
    fn from(row: AnimeCacheRow) -> Self {
        Anime {
            id: row.anime_id as u64,
            title: row.title,
            title_english: row.title_english,
            images: AnimeImages {
                image_url: row.image_url,
                large_image_url: row.large_image_url,
            },
            year: row.year,
            season: row.season.and_then(|s| s.parse().ok()),
            anime_type: row.anime_type.map(AnimeType::from),
            episodes: row.episodes.map(|e| e.max(0) as u32),
            score: row.score,
            popularity: row.popularity.map(|p| p.max(0) as u32),
            genres: row.genres,
            studios: row.studios,
            demographics: row.demographics,
            synopsis: row.synopsis,
            status: row.status,
            source: row.source,
            rating: row.rating,
            cached_at: Some(row.cached_at),
        }
    }
}

/// Metadata store backed by the `anime_cache` table
#[derive(Clone)]
pub struct PgMetadataStore {
    pool: PgPool,
}

impl PgMetadataStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MetadataStore for PgMetadataStore {
    async fn get(&self, id: AnimeId) -> AppResult<Option<Anime>> {
        let row = sqlx::query_as::<_, AnimeCacheRow>(
            r#"
            SELECT anime_id, title, title_english, image_url, large_image_url, year, season,
                   anime_type, episodes, score, popularity, genres, studios, demographics,
                   synopsis, status, source, rating, cached_at
            FROM anime_cache
            WHERE anime_id = $1
            "#,
        )
        .bind(id as i64)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Anime::from))
    }

    async fn put(&self, anime: &Anime) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO anime_cache (
                anime_id, title, title_english, image_url, large_image_url, year, season,
                anime_type, episodes, score, popularity, genres, studios, demographics,
                synopsis, status, source, rating, cached_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            ON CONFLICT (anime_id) DO UPDATE SET
                title = EXCLUDED.title,
                title_english = EXCLUDED.title_english,
                image_url = EXCLUDED.image_url,
                large_image_url = EXCLUDED.large_image_url,
                year = EXCLUDED.year,
                season = EXCLUDED.season,
                anime_type = EXCLUDED.anime_type,
                episodes = EXCLUDED.episodes,
                score = EXCLUDED.score,
                popularity = EXCLUDED.popularity,
                genres = EXCLUDED.genres,
                studios = EXCLUDED.studios,
                demographics = EXCLUDED.demographics,
                synopsis = EXCLUDED.synopsis,
                status = EXCLUDED.status,
                source = EXCLUDED.source,
                rating = EXCLUDED.rating,
                cached_at = EXCLUDED.cached_at
            "#,
        )
        .bind(anime.id as i64)
        .bind(&anime.title)
        .bind(&anime.title_english)
        .bind(&anime.images.image_url)
        .bind(&anime.images.large_image_url)
        .bind(anime.year)
        .bind(anime.season.map(|s| s.as_str()))
        .bind(anime.anime_type.as_ref().map(|t| t.as_str()))
        .bind(anime.episodes.map(|e| e as i32))
        .bind(anime.score)
        .bind(anime.popularity.map(|p| p as i32))
        .bind(&anime.genres)
        .bind(&anime.studios)
        .bind(&anime.demographics)
        .bind(&anime.synopsis)
        .bind(&anime.status)
        .bind(&anime.source)
        .bind(&anime.rating)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        tracing::debug!(anime_id = anime.id, "Cached anime metadata");

        Ok(())
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Process-local metadata store, used by tests and database-less runs
#[derive(Default)]
pub struct InMemoryMetadataStore {
    records: RwLock<HashMap<AnimeId, Anime>>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a record with an explicit cache timestamp
    pub async fn insert_with_timestamp(&self, mut anime: Anime, cached_at: DateTime<Utc>) {
        anime.cached_at = Some(cached_at);
        self.records.write().await.insert(anime.id, anime);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn get(&self, id: AnimeId) -> AppResult<Option<Anime>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn put(&self, anime: &Anime) -> AppResult<()> {
        self.insert_with_timestamp(anime.clone(), Utc::now()).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cached(days_ago: i64, now: DateTime<Utc>) -> Anime {
        let mut anime = Anime::new(42, "Mushishi");
        anime.cached_at = Some(now - Duration::days(days_ago));
        anime
    }

    #[test]
    fn test_is_fresh_within_window() {
        let now = Utc::now();
        assert!(is_fresh(&cached(0, now), now, DEFAULT_FRESHNESS_DAYS));
        assert!(is_fresh(&cached(6, now), now, DEFAULT_FRESHNESS_DAYS));
    }

    #[test]
    fn test_is_fresh_exactly_at_threshold_is_stale() {
        let now = Utc::now();
        assert!(!is_fresh(&cached(7, now), now, DEFAULT_FRESHNESS_DAYS));
        assert!(!is_fresh(&cached(8, now), now, DEFAULT_FRESHNESS_DAYS));
    }

    #[test]
    fn test_record_without_timestamp_is_stale() {
        let anime = Anime::new(1, "Never cached");
        assert!(!is_fresh(&anime, Utc::now(), DEFAULT_FRESHNESS_DAYS));
    }

    #[tokio::test]
    async fn test_in_memory_put_overwrites_and_stamps() {
        let store = InMemoryMetadataStore::new();
        let before = Utc::now();

        let mut anime = Anime::new(42, "Mushishi");
        anime.score = Some(8.6);
        store.put(&anime).await.unwrap();

        anime.score = Some(8.7);
        store.put(&anime).await.unwrap();

        assert_eq!(store.len().await, 1);
        let stored = store.get(42).await.unwrap().unwrap();
        assert_eq!(stored.score, Some(8.7));
        assert!(stored.cached_at.unwrap() >= before);
    }

    #[tokio::test]
    async fn test_in_memory_get_missing_is_none() {
        let store = InMemoryMetadataStore::new();
        assert!(store.get(7).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }
}
