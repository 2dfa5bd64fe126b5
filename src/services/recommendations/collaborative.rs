use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{SavedList, SavedListRepository},
    models::AnimeId,
};

/// Ceiling on the collaborative boost
pub const MAX_BOOST: f64 = 20.0;
const BOOST_SCALE: f64 = 6.0;

/// Log-damped boost for a co-occurrence count, so sheer volume cannot dominate
pub fn boost_for(count: u32) -> f64 {
    if count == 0 {
        return 0.0;
    }
    ((f64::from(count) + 1.0).ln() * BOOST_SCALE).min(MAX_BOOST)
}

/// Justification attached to boosted candidates
pub fn boost_note(count: u32) -> String {
    let fans = if count == 1 { "fan" } else { "fans" };
    format!("Saved by {} {} of your favorites", count, fans)
}

/// Per-candidate count of other users who saved it alongside a seed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoOccurrence {
    counts: HashMap<AnimeId, u32>,
}

impl CoOccurrence {
    /// Tallies every non-seed title once per list that contains a seed
    pub fn from_lists(lists: &[SavedList], seed_ids: &HashSet<AnimeId>) -> Self {
        let mut counts: HashMap<AnimeId, u32> = HashMap::new();

        for list in lists {
            if !list.anime_ids.iter().any(|id| seed_ids.contains(id)) {
                continue;
            }
            let distinct: HashSet<AnimeId> = list
                .anime_ids
                .iter()
                .copied()
                .filter(|id| !seed_ids.contains(id))
                .collect();
            for id in distinct {
                *counts.entry(id).or_default() += 1;
            }
        }

        Self { counts }
    }

    pub fn count(&self, id: AnimeId) -> u32 {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    pub fn boost(&self, id: AnimeId) -> f64 {
        boost_for(self.count(id))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Gathers co-occurrence data; best effort, never fails
#[derive(Clone, Default)]
pub struct CollaborativeBooster {
    repository: Option<Arc<dyn SavedListRepository>>,
}

impl CollaborativeBooster {
    pub fn new(repository: Arc<dyn SavedListRepository>) -> Self {
        Self {
            repository: Some(repository),
        }
    }

    /// Booster that never boosts
    pub fn disabled() -> Self {
        Self { repository: None }
    }

    /// Counts for the given seeds, empty when no data is available or the lookup fails
    pub async fn co_occurrence(
        &self,
        seed_ids: &HashSet<AnimeId>,
        exclude_user: Option<Uuid>,
    ) -> CoOccurrence {
        let Some(repository) = &self.repository else {
            return CoOccurrence::default();
        };

        let mut ids: Vec<AnimeId> = seed_ids.iter().copied().collect();
        ids.sort_unstable();

        match repository.lists_containing(&ids, exclude_user).await {
            Ok(lists) => {
                let co_occurrence = CoOccurrence::from_lists(&lists, seed_ids);
                tracing::debug!(
                    users = lists.len(),
                    candidates = co_occurrence.counts.len(),
                    "Co-occurrence gathered"
                );
                co_occurrence
            }
            Err(e) => {
                tracing::warn!(error = %e, "Co-occurrence lookup failed, skipping collaborative boost");
                CoOccurrence::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::saved_lists::MockSavedListRepository, error::AppError};

    fn list(ids: &[AnimeId]) -> SavedList {
        SavedList {
            user_id: Uuid::new_v4(),
            anime_ids: ids.to_vec(),
        }
    }

    #[test]
    fn test_boost_is_zero_without_support() {
        assert_eq!(boost_for(0), 0.0);
    }

    #[test]
    fn test_boost_is_monotonic_and_capped() {
        let mut previous = 0.0;
        for count in 0..500 {
            let boost = boost_for(count);
            assert!(boost >= previous, "boost decreased at count {}", count);
            assert!(boost <= MAX_BOOST);
            previous = boost;
        }
        assert_eq!(boost_for(10_000), MAX_BOOST);
    }

    #[test]
    fn test_boost_for_single_supporter() {
        let expected = 2f64.ln() * 6.0;
        assert!((boost_for(1) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_counts_only_lists_sharing_a_seed() {
        let seeds = HashSet::from([1, 2]);
        let lists = vec![
            list(&[1, 10, 11]),
            list(&[2, 10]),
            list(&[1, 2, 10, 10]),
            list(&[30, 10]),
        ];

        let co = CoOccurrence::from_lists(&lists, &seeds);
        assert_eq!(co.count(10), 3);
        assert_eq!(co.count(11), 1);
        assert_eq!(co.count(30), 0);
        assert_eq!(co.count(1), 0, "seeds are never counted");
    }

    #[test]
    fn test_boost_note_names_supporter_count() {
        assert_eq!(boost_note(1), "Saved by 1 fan of your favorites");
        assert_eq!(boost_note(4), "Saved by 4 fans of your favorites");
    }

    #[tokio::test]
    async fn test_repository_failure_degrades_to_no_boost() {
        let mut repo = MockSavedListRepository::new();
        repo.expect_lists_containing()
            .returning(|_, _| Err(AppError::Internal("db down".to_string())));

        let booster = CollaborativeBooster::new(Arc::new(repo));
        let co = booster.co_occurrence(&HashSet::from([1]), None).await;
        assert!(co.is_empty());
    }

    #[tokio::test]
    async fn test_disabled_booster_never_queries() {
        let co = CollaborativeBooster::disabled()
            .co_occurrence(&HashSet::from([1]), None)
            .await;
        assert!(co.is_empty());
    }

    #[tokio::test]
    async fn test_requesting_user_is_passed_through() {
        let me = Uuid::new_v4();
        let mut repo = MockSavedListRepository::new();
        repo.expect_lists_containing()
            .withf(move |ids, exclude| ids.to_vec() == vec![7u64] && *exclude == Some(me))
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let booster = CollaborativeBooster::new(Arc::new(repo));
        booster.co_occurrence(&HashSet::from([7]), Some(me)).await;
    }
}
