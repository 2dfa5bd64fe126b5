/// Jikan v4 provider (unofficial MyAnimeList API)
///
/// Endpoints used:
/// 1. Details: /anime/{id}/full
/// 2. Search: /anime?q=...
/// 3. Listings: /top/anime, /seasons/upcoming, /seasons/{year}/{season}
///
/// Listing pages hold at most 25 entries, so larger requests walk pages until
/// enough entries arrive or the upstream runs out. Listings are cached in
/// Redis when a cache is configured; single-title lookups are not, since the
/// metadata store already covers them.
use crate::{
    cached,
    config::Config,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{Anime, AnimeId, JikanAnime, JikanResponse, Season},
    services::providers::{dedup_by_id, MetadataProvider},
};
use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;
use std::{sync::Arc, time::Duration};
use tokio::sync::Semaphore;

/// Largest page the upstream serves
const PAGE_SIZE: usize = 25;
/// Seasonal listings rarely exceed a few pages
const MAX_SEASON_PAGES: u32 = 4;
const USER_AGENT: &str = concat!("binge-api/", env!("CARGO_PKG_VERSION"));

/// Transport knobs for the Jikan client
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub request_timeout_secs: u64,
    pub max_concurrent_requests: usize,
    pub cache_ttl_secs: u64,
    pub safe_search: bool,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: 10,
            max_concurrent_requests: 3,
            cache_ttl_secs: 3600,
            safe_search: true,
        }
    }
}

impl From<&Config> for ProviderSettings {
    fn from(config: &Config) -> Self {
        Self {
            request_timeout_secs: config.request_timeout_secs,
            max_concurrent_requests: config.max_concurrent_requests,
            cache_ttl_secs: config.listing_cache_ttl_secs,
            safe_search: config.safe_search,
        }
    }
}

#[derive(Clone)]
pub struct JikanProvider {
    http_client: HttpClient,
    api_url: String,
    cache: Option<Cache>,
    settings: ProviderSettings,
    /// Bounds simultaneous outbound requests across all clones
    permits: Arc<Semaphore>,
}

impl JikanProvider {
    pub fn new(
        api_url: impl Into<String>,
        cache: Option<Cache>,
        settings: ProviderSettings,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        let permits = Arc::new(Semaphore::new(settings.max_concurrent_requests.max(1)));

        Ok(Self {
            http_client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            cache,
            settings,
            permits,
        })
    }

    fn sfw_param(&self) -> Option<(&'static str, String)> {
        self.settings
            .safe_search
            .then(|| ("sfw", "true".to_string()))
    }

    /// GETs a Jikan path and decodes the envelope, `None` on 404
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<Option<JikanResponse<T>>> {
        let url = format!("{}{}", self.api_url, path);

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| AppError::Internal(format!("Request limiter closed: {}", e)))?;

        let response = self.http_client.get(&url).query(query).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Jikan API returned status {}: {}",
                status, body
            )));
        }

        let envelope = response.json::<JikanResponse<T>>().await?;
        Ok(Some(envelope))
    }

    /// Walks a paginated listing until `limit` entries or the last page
    async fn fetch_paged(
        &self,
        path: &str,
        base_query: Vec<(&'static str, String)>,
        limit: Option<usize>,
        max_pages: u32,
    ) -> AppResult<Vec<Anime>> {
        let per_page = limit.map_or(PAGE_SIZE, |l| l.clamp(1, PAGE_SIZE));
        let mut collected: Vec<Anime> = Vec::new();
        let mut page: u32 = 1;

        loop {
            let mut query = base_query.clone();
            query.push(("page", page.to_string()));
            query.push(("limit", per_page.to_string()));

            let envelope = match self.get_json::<Vec<JikanAnime>>(path, &query).await {
                Ok(Some(envelope)) => envelope,
                Ok(None) => break,
                Err(e) if page == 1 => return Err(e),
                Err(e) => {
                    // Later pages are often rate limited; keep what arrived
                    tracing::warn!(
                        error = %e,
                        path = %path,
                        page,
                        collected = collected.len(),
                        "Listing page failed, returning partial results"
                    );
                    break;
                }
            };

            let received = envelope.data.len();
            let has_next = envelope
                .pagination
                .as_ref()
                .is_some_and(|p| p.has_next_page);
            collected.extend(envelope.data.into_iter().map(Anime::from));

            let satisfied = limit.is_some_and(|l| collected.len() >= l);
            if satisfied || !has_next || received == 0 || page >= max_pages {
                break;
            }
            page += 1;
        }

        let mut deduped = dedup_by_id(collected);
        if let Some(limit) = limit {
            deduped.truncate(limit);
        }
        Ok(deduped)
    }
}

#[async_trait::async_trait]
impl MetadataProvider for JikanProvider {
    #[tracing::instrument(skip(self))]
    async fn fetch_by_id(&self, id: AnimeId) -> AppResult<Option<Anime>> {
        let envelope = self
            .get_json::<JikanAnime>(&format!("/anime/{}/full", id), &[])
            .await?;

        let anime = envelope.map(|e| Anime::from(e.data));
        tracing::info!(
            found = anime.is_some(),
            provider = "jikan",
            "Anime details fetched"
        );
        Ok(anime)
    }

    #[tracing::instrument(skip(self))]
    async fn search(&self, query: &str, limit: usize) -> AppResult<Vec<Anime>> {
        let query = query.trim();
        if query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let limit = limit.min(PAGE_SIZE);

        cached!(
            self.cache,
            CacheKey::Search {
                query: query.to_string(),
                limit,
            },
            self.settings.cache_ttl_secs,
            async move {
                let mut params = vec![("q", query.to_string()), ("limit", limit.to_string())];
                params.extend(self.sfw_param());

                let results = self
                    .get_json::<Vec<JikanAnime>>("/anime", &params)
                    .await?
                    .map(|e| e.data.into_iter().map(Anime::from).collect::<Vec<_>>())
                    .unwrap_or_default();
                let results = dedup_by_id(results);

                tracing::info!(
                    results = results.len(),
                    provider = "jikan",
                    "Anime search completed"
                );

                Ok::<_, AppError>(results)
            }
        )
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_top(&self, limit: usize) -> AppResult<Vec<Anime>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let max_pages = limit.div_ceil(PAGE_SIZE) as u32;

        cached!(
            self.cache,
            CacheKey::TopAnime { limit },
            self.settings.cache_ttl_secs,
            async move {
                let base_query: Vec<_> = self.sfw_param().into_iter().collect();
                let top = self
                    .fetch_paged("/top/anime", base_query, Some(limit), max_pages)
                    .await?;
                tracing::info!(count = top.len(), provider = "jikan", "Top anime fetched");
                Ok::<_, AppError>(top)
            }
        )
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_upcoming(&self, limit: usize) -> AppResult<Vec<Anime>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let max_pages = limit.div_ceil(PAGE_SIZE) as u32;

        cached!(
            self.cache,
            CacheKey::Upcoming { limit },
            self.settings.cache_ttl_secs,
            async move {
                let base_query: Vec<_> = self.sfw_param().into_iter().collect();
                self.fetch_paged("/seasons/upcoming", base_query, Some(limit), max_pages)
                    .await
            }
        )
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_seasonal(&self, year: i32, season: Season) -> AppResult<Vec<Anime>> {
        cached!(
            self.cache,
            CacheKey::Seasonal { year, season },
            self.settings.cache_ttl_secs,
            async move {
                let path = format!("/seasons/{}/{}", year, season);
                let base_query: Vec<_> = self.sfw_param().into_iter().collect();
                self.fetch_paged(&path, base_query, None, MAX_SEASON_PAGES)
                    .await
            }
        )
    }

    fn name(&self) -> &'static str {
        "jikan"
    }
}
