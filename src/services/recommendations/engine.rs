use futures::future::join_all;
use std::collections::HashSet;
use std::fmt::Display;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use super::{
    collaborative::CollaborativeBooster, enrichment::ResultEnricher, explain, features, filter,
    profile, scorer,
};
use crate::{
    models::{Anime, AnimeId, RecommendationResult, UserPreferences},
    services::catalog::Catalog,
};

/// Default number of candidates pulled from the top listing
pub const DEFAULT_CANDIDATE_POOL_SIZE: usize = 200;
const DEFAULT_ENRICHMENT_TIMEOUT: Duration = Duration::from_secs(2);

/// Pipeline stages, logged as the engine moves through them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResolvingSeeds,
    BuildingProfile,
    FetchingCandidates,
    Filtering,
    Scoring,
    Ranking,
    Done,
    EmptyResult,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::ResolvingSeeds => "resolving_seeds",
            Stage::BuildingProfile => "building_profile",
            Stage::FetchingCandidates => "fetching_candidates",
            Stage::Filtering => "filtering",
            Stage::Scoring => "scoring",
            Stage::Ranking => "ranking",
            Stage::Done => "done",
            Stage::EmptyResult => "empty_result",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub candidate_pool_size: usize,
    pub enrichment_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            candidate_pool_size: DEFAULT_CANDIDATE_POOL_SIZE,
            enrichment_timeout: DEFAULT_ENRICHMENT_TIMEOUT,
        }
    }
}

/// Scored candidate before explanation
struct Scored {
    anime: Anime,
    score: f64,
    co_occurrence: u32,
}

/// Stateless, re-entrant recommendation pipeline
///
/// Seeds are resolved through the catalog, aggregated into a taste profile,
/// and compared against the top-ranked pool. Every failure inside degrades to
/// fewer (or no) results; nothing is returned as an error.
#[derive(Clone)]
pub struct RecommendationEngine {
    catalog: Catalog,
    booster: CollaborativeBooster,
    enricher: Option<Arc<dyn ResultEnricher>>,
    settings: EngineSettings,
}

impl RecommendationEngine {
    pub fn new(catalog: Catalog, booster: CollaborativeBooster, settings: EngineSettings) -> Self {
        Self {
            catalog,
            booster,
            enricher: None,
            settings,
        }
    }

    /// Attaches a decoration stage that runs after ranking
    pub fn with_enricher(mut self, enricher: Arc<dyn ResultEnricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    /// Ranked recommendations for a seed set
    pub async fn get_recommendations(
        &self,
        seed_ids: &[AnimeId],
        preferences: &UserPreferences,
        limit: usize,
    ) -> Vec<RecommendationResult> {
        self.get_recommendations_for_user(seed_ids, preferences, limit, None)
            .await
    }

    /// Like [`get_recommendations`](Self::get_recommendations), leaving the
    /// requesting user's own saved lists out of co-occurrence counting
    #[tracing::instrument(skip(self, preferences), fields(seeds = seed_ids.len()))]
    pub async fn get_recommendations_for_user(
        &self,
        seed_ids: &[AnimeId],
        preferences: &UserPreferences,
        limit: usize,
        requesting_user: Option<Uuid>,
    ) -> Vec<RecommendationResult> {
        let start = Instant::now();

        enter(Stage::ResolvingSeeds);
        let seeds = self.resolve_seeds(seed_ids).await;
        if seeds.is_empty() || limit == 0 {
            enter(Stage::EmptyResult);
            return Vec::new();
        }

        enter(Stage::BuildingProfile);
        let Some(profile) = profile::build(&seeds) else {
            enter(Stage::EmptyResult);
            return Vec::new();
        };

        enter(Stage::FetchingCandidates);
        let seed_set: HashSet<AnimeId> = seed_ids.iter().copied().collect();
        let (pool, co_occurrence) = tokio::join!(
            self.catalog.top(self.settings.candidate_pool_size),
            self.booster.co_occurrence(&seed_set, requesting_user)
        );
        if pool.is_empty() {
            tracing::warn!("Candidate pool is empty");
            enter(Stage::EmptyResult);
            return Vec::new();
        }
        let pool_size = pool.len();

        enter(Stage::Filtering);
        let candidates = filter::filter(pool, &seed_set, preferences);

        enter(Stage::Scoring);
        let mut scored: Vec<Scored> = candidates
            .into_iter()
            .map(|anime| {
                let similarity = scorer::score(&profile, &features::extract(&anime), preferences);
                let co_count = co_occurrence.count(anime.id);
                let score = (similarity + co_occurrence.boost(anime.id)).clamp(0.0, scorer::MAX_SCORE);
                Scored {
                    anime,
                    score,
                    co_occurrence: co_count,
                }
            })
            .collect();

        enter(Stage::Ranking);
        // Stable: equal scores keep pool order
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(limit);

        let mut results: Vec<RecommendationResult> = scored
            .into_iter()
            .map(|s| RecommendationResult {
                reasons: explain::reasons(&s.anime, &seeds, s.co_occurrence),
                anime: s.anime,
                score: s.score,
                mention_count: None,
            })
            .collect();

        if let Some(enricher) = &self.enricher {
            self.enrich(enricher.as_ref(), &mut results).await;
        }

        enter(Stage::Done);
        tracing::info!(
            resolved_seeds = seeds.len(),
            pool_size,
            returned = results.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Recommendations computed"
        );

        results
    }

    /// Looks seeds up concurrently, dropping ids that cannot be resolved
    async fn resolve_seeds(&self, seed_ids: &[AnimeId]) -> Vec<Anime> {
        let mut unique: Vec<AnimeId> = Vec::with_capacity(seed_ids.len());
        for id in seed_ids {
            if !unique.contains(id) {
                unique.push(*id);
            }
        }

        let resolved = join_all(unique.iter().map(|id| self.catalog.get_by_id(*id))).await;
        let seeds: Vec<Anime> = resolved.into_iter().flatten().collect();

        if seeds.len() < unique.len() {
            tracing::warn!(
                requested = unique.len(),
                resolved = seeds.len(),
                "Some seed titles could not be resolved"
            );
        }

        seeds
    }

    async fn enrich(&self, enricher: &dyn ResultEnricher, results: &mut [RecommendationResult]) {
        let anime: Vec<Anime> = results.iter().map(|r| r.anime.clone()).collect();

        match tokio::time::timeout(self.settings.enrichment_timeout, enricher.mention_counts(&anime))
            .await
        {
            Ok(Ok(counts)) => {
                for result in results.iter_mut() {
                    result.mention_count = counts.get(&result.anime.id).copied();
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, enricher = enricher.name(), "Enrichment failed");
            }
            Err(_) => {
                tracing::warn!(enricher = enricher.name(), "Enrichment timed out");
            }
        }
    }
}

fn enter(stage: Stage) {
    tracing::debug!(stage = %stage, "Recommendation stage");
}
