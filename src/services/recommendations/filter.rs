use std::collections::HashSet;

use crate::models::{Anime, AnimeId, ContentRatingFilter, EpisodeLength, UserPreferences};

/// Removes seeds and everything the user's preferences rule out
///
/// Predicates run in a fixed order: seed exclusion, content rating, avoided
/// genres, episode length. Pool order is preserved for the survivors.
pub fn filter(
    candidates: Vec<Anime>,
    seed_ids: &HashSet<AnimeId>,
    preferences: &UserPreferences,
) -> Vec<Anime> {
    let avoided: Vec<String> = preferences
        .avoid_genres
        .iter()
        .map(|g| g.to_lowercase())
        .collect();

    candidates
        .into_iter()
        .filter(|anime| !seed_ids.contains(&anime.id))
        .filter(|anime| rating_allowed(preferences.content_rating_filter, anime.rating.as_deref()))
        .filter(|anime| {
            avoided.is_empty()
                || !anime
                    .genres
                    .iter()
                    .any(|g| avoided.contains(&g.to_lowercase()))
        })
        .filter(|anime| {
            episode_length_allowed(
                preferences.preferred_episode_length,
                anime.episodes.unwrap_or(0),
            )
        })
        .collect()
}

/// Unrated titles always pass
fn rating_allowed(filter: ContentRatingFilter, rating: Option<&str>) -> bool {
    let Some(rating) = rating else {
        return true;
    };

    match filter {
        ContentRatingFilter::ShowAll => true,
        ContentRatingFilter::TeenAndUnder => !(rating.contains("R+") || rating.contains("Rx")),
        ContentRatingFilter::NoAdult => !rating.contains("Rx"),
    }
}

/// The short and medium bands overlap at 12-13 episodes, and medium and long at 24-26
fn episode_length_allowed(preference: EpisodeLength, episodes: u32) -> bool {
    match preference {
        EpisodeLength::Any => true,
        EpisodeLength::Short => episodes <= 13,
        EpisodeLength::Medium => (12..=26).contains(&episodes),
        EpisodeLength::Long => episodes >= 24,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: AnimeId, genres: &[&str], rating: Option<&str>, episodes: Option<u32>) -> Anime {
        let mut anime = Anime::new(id, format!("Candidate {}", id));
        anime.genres = genres.iter().map(|g| g.to_string()).collect();
        anime.rating = rating.map(str::to_string);
        anime.episodes = episodes;
        anime
    }

    fn ids(anime: &[Anime]) -> Vec<AnimeId> {
        anime.iter().map(|a| a.id).collect()
    }

    #[test]
    fn test_seeds_are_removed() {
        let pool = vec![candidate(1, &[], None, None), candidate(2, &[], None, None)];
        let seeds = HashSet::from([1]);
        let kept = filter(pool, &seeds, &UserPreferences::default());
        assert_eq!(ids(&kept), vec![2]);
    }

    #[test]
    fn test_teen_filter_drops_r_plus_and_rx() {
        let pool = vec![
            candidate(1, &[], Some("PG-13 - Teens 13 or older"), None),
            candidate(2, &[], Some("R - 17+ (violence & profanity)"), None),
            candidate(3, &[], Some("R+ - Mild Nudity"), None),
            candidate(4, &[], Some("Rx - Hentai"), None),
            candidate(5, &[], None, None),
        ];
        let prefs = UserPreferences {
            content_rating_filter: ContentRatingFilter::TeenAndUnder,
            ..UserPreferences::default()
        };
        let kept = filter(pool, &HashSet::new(), &prefs);
        assert_eq!(ids(&kept), vec![1, 2, 5]);
    }

    #[test]
    fn test_no_adult_filter_drops_only_rx() {
        let pool = vec![
            candidate(1, &[], Some("R+ - Mild Nudity"), None),
            candidate(2, &[], Some("Rx - Hentai"), None),
        ];
        let prefs = UserPreferences {
            content_rating_filter: ContentRatingFilter::NoAdult,
            ..UserPreferences::default()
        };
        let kept = filter(pool, &HashSet::new(), &prefs);
        assert_eq!(ids(&kept), vec![1]);
    }

    #[test]
    fn test_avoided_genres_are_case_insensitive() {
        let pool = vec![
            candidate(1, &["Horror", "Mystery"], None, None),
            candidate(2, &["Comedy"], None, None),
            candidate(3, &["HORROR"], None, None),
        ];
        let prefs = UserPreferences {
            avoid_genres: vec!["horror".to_string()],
            ..UserPreferences::default()
        };
        let kept = filter(pool, &HashSet::new(), &prefs);
        assert_eq!(ids(&kept), vec![2]);
    }

    #[test]
    fn test_short_band_keeps_thirteen_and_unknown() {
        let pool = vec![
            candidate(1, &[], None, Some(12)),
            candidate(2, &[], None, Some(13)),
            candidate(3, &[], None, Some(14)),
            candidate(4, &[], None, None),
        ];
        let prefs = UserPreferences {
            preferred_episode_length: EpisodeLength::Short,
            ..UserPreferences::default()
        };
        let kept = filter(pool, &HashSet::new(), &prefs);
        assert_eq!(ids(&kept), vec![1, 2, 4]);
    }

    #[test]
    fn test_medium_and_long_bands_overlap_with_neighbours() {
        assert!(episode_length_allowed(EpisodeLength::Medium, 12));
        assert!(episode_length_allowed(EpisodeLength::Medium, 26));
        assert!(!episode_length_allowed(EpisodeLength::Medium, 11));
        assert!(!episode_length_allowed(EpisodeLength::Medium, 27));
        assert!(episode_length_allowed(EpisodeLength::Long, 24));
        assert!(!episode_length_allowed(EpisodeLength::Long, 23));
        assert!(!episode_length_allowed(EpisodeLength::Long, 0));
    }
}
