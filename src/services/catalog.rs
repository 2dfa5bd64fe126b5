use chrono::Utc;
use std::sync::Arc;

use crate::{
    db::{is_fresh, MetadataStore},
    models::{Anime, AnimeId, Season},
    services::providers::MetadataProvider,
};

/// Pull-through front for the metadata store and the upstream provider
///
/// This is the failure boundary for catalog data: store and provider errors
/// are logged here and come back as absent/empty results, never as errors.
#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn MetadataStore>,
    provider: Arc<dyn MetadataProvider>,
    freshness_days: i64,
}

impl Catalog {
    pub fn new(
        store: Arc<dyn MetadataStore>,
        provider: Arc<dyn MetadataProvider>,
        freshness_days: i64,
    ) -> Self {
        Self {
            store,
            provider,
            freshness_days,
        }
    }

    /// Returns a fresh cached record, otherwise refetches and caches it
    #[tracing::instrument(skip(self))]
    pub async fn get_by_id(&self, id: AnimeId) -> Option<Anime> {
        match self.store.get(id).await {
            Ok(Some(cached)) if is_fresh(&cached, Utc::now(), self.freshness_days) => {
                tracing::debug!("Metadata cache hit");
                return Some(cached);
            }
            Ok(Some(_)) => tracing::debug!("Cached metadata is stale, refetching"),
            Ok(None) => tracing::debug!("Metadata cache miss"),
            Err(e) => tracing::warn!(error = %e, "Metadata store read failed, treating as miss"),
        }

        let anime = match self.provider.fetch_by_id(id).await {
            Ok(Some(anime)) => anime,
            Ok(None) => {
                tracing::info!(provider = self.provider.name(), "Anime not found upstream");
                return None;
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    provider = self.provider.name(),
                    "Failed to fetch anime details"
                );
                return None;
            }
        };

        if let Err(e) = self.store.put(&anime).await {
            tracing::warn!(error = %e, "Failed to write anime to metadata store");
        }

        Some(anime)
    }

    /// Free-text search; empty on any failure
    pub async fn search(&self, query: &str, limit: usize) -> Vec<Anime> {
        self.provider
            .search(query, limit)
            .await
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, query = %query, "Anime search failed");
                Vec::new()
            })
    }

    /// Globally ranked titles; empty on any failure
    pub async fn top(&self, limit: usize) -> Vec<Anime> {
        self.provider.fetch_top(limit).await.unwrap_or_else(|e| {
            tracing::error!(error = %e, limit, "Failed to fetch top anime");
            Vec::new()
        })
    }

    /// Announced titles; empty on any failure
    pub async fn upcoming(&self, limit: usize) -> Vec<Anime> {
        self.provider.fetch_upcoming(limit).await.unwrap_or_else(|e| {
            tracing::error!(error = %e, limit, "Failed to fetch upcoming anime");
            Vec::new()
        })
    }

    /// One broadcast season; empty on any failure
    pub async fn seasonal(&self, year: i32, season: Season) -> Vec<Anime> {
        self.provider
            .fetch_seasonal(year, season)
            .await
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, year, season = %season, "Failed to fetch seasonal anime");
                Vec::new()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{metadata_store::MockMetadataStore, InMemoryMetadataStore, DEFAULT_FRESHNESS_DAYS},
        error::AppError,
        services::providers::MockMetadataProvider,
    };
    use chrono::Duration;

    fn fetched(id: AnimeId, title: &str) -> Anime {
        Anime::new(id, title)
    }

    #[tokio::test]
    async fn test_fresh_hit_skips_provider() {
        let store = Arc::new(InMemoryMetadataStore::new());
        store
            .insert_with_timestamp(fetched(42, "Cached"), Utc::now() - Duration::days(1))
            .await;

        let mut provider = MockMetadataProvider::new();
        provider.expect_fetch_by_id().never();

        let catalog = Catalog::new(store, Arc::new(provider), DEFAULT_FRESHNESS_DAYS);
        let anime = catalog.get_by_id(42).await.unwrap();
        assert_eq!(anime.title, "Cached");
    }

    #[tokio::test]
    async fn test_stale_record_triggers_refetch() {
        let store = Arc::new(InMemoryMetadataStore::new());
        store
            .insert_with_timestamp(fetched(42, "Stale"), Utc::now() - Duration::days(8))
            .await;

        let mut provider = MockMetadataProvider::new();
        provider
            .expect_fetch_by_id()
            .withf(|id| *id == 42)
            .times(1)
            .returning(|id| Ok(Some(fetched(id, "Refreshed"))));
        provider.expect_name().return_const("mock");

        let catalog = Catalog::new(store.clone(), Arc::new(provider), DEFAULT_FRESHNESS_DAYS);
        let anime = catalog.get_by_id(42).await.unwrap();
        assert_eq!(anime.title, "Refreshed");

        let stored = store.get(42).await.unwrap().unwrap();
        assert_eq!(stored.title, "Refreshed");
        assert!(is_fresh(&stored, Utc::now(), DEFAULT_FRESHNESS_DAYS));
    }

    #[tokio::test]
    async fn test_miss_fetches_and_writes_through() {
        let store = Arc::new(InMemoryMetadataStore::new());

        let mut provider = MockMetadataProvider::new();
        provider
            .expect_fetch_by_id()
            .times(1)
            .returning(|id| Ok(Some(fetched(id, "New"))));
        provider.expect_name().return_const("mock");

        let catalog = Catalog::new(store.clone(), Arc::new(provider), DEFAULT_FRESHNESS_DAYS);
        assert!(catalog.get_by_id(5).await.is_some());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_failure_falls_through_to_provider() {
        let mut store = MockMetadataStore::new();
        store
            .expect_get()
            .returning(|_| Err(AppError::Internal("store down".to_string())));
        store
            .expect_put()
            .returning(|_| Err(AppError::Internal("store down".to_string())));

        let mut provider = MockMetadataProvider::new();
        provider
            .expect_fetch_by_id()
            .times(1)
            .returning(|id| Ok(Some(fetched(id, "From upstream"))));
        provider.expect_name().return_const("mock");

        let catalog = Catalog::new(Arc::new(store), Arc::new(provider), DEFAULT_FRESHNESS_DAYS);
        let anime = catalog.get_by_id(9).await.unwrap();
        assert_eq!(anime.title, "From upstream");
    }

    #[tokio::test]
    async fn test_provider_failure_degrades_to_none() {
        let store = Arc::new(InMemoryMetadataStore::new());

        let mut provider = MockMetadataProvider::new();
        provider
            .expect_fetch_by_id()
            .returning(|_| Err(AppError::ExternalApi("503".to_string())));
        provider.expect_name().return_const("mock");

        let catalog = Catalog::new(store.clone(), Arc::new(provider), DEFAULT_FRESHNESS_DAYS);
        assert!(catalog.get_by_id(1).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_listing_failures_degrade_to_empty() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_fetch_top()
            .returning(|_| Err(AppError::ExternalApi("429".to_string())));
        provider
            .expect_search()
            .returning(|_, _| Err(AppError::ExternalApi("429".to_string())));
        provider
            .expect_fetch_upcoming()
            .returning(|_| Err(AppError::ExternalApi("429".to_string())));
        provider
            .expect_fetch_seasonal()
            .returning(|_, _| Err(AppError::ExternalApi("429".to_string())));

        let catalog = Catalog::new(
            Arc::new(InMemoryMetadataStore::new()),
            Arc::new(provider),
            DEFAULT_FRESHNESS_DAYS,
        );
        assert!(catalog.top(200).await.is_empty());
        assert!(catalog.search("naruto", 10).await.is_empty());
        assert!(catalog.upcoming(25).await.is_empty());
        assert!(catalog.seasonal(2024, Season::Spring).await.is_empty());
    }
}
