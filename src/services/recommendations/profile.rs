use std::collections::BTreeSet;

use super::features::{EpisodeBucket, FeatureVector, DEFAULT_EPISODES};
use crate::models::{Anime, AnimeType};

/// Aggregate taste of a seed set, shaped like a single title's features
pub type TasteProfile = FeatureVector;

/// Source category assumed when no seed names one
pub const DEFAULT_PROFILE_SOURCE: &str = "Manga";

/// Builds a taste profile from resolved seeds, `None` when there are none
///
/// Genre, studio and demographic sets are unions. Type and source are the most
/// frequent value among seeds, ties going to the first one seen. Score and
/// popularity are means over all seeds (missing counts as 0); the episode
/// bucket comes from the mean of the known episode counts.
pub fn build(seeds: &[Anime]) -> Option<TasteProfile> {
    if seeds.is_empty() {
        return None;
    }

    let mut genres = BTreeSet::new();
    let mut studios = BTreeSet::new();
    let mut demographics = BTreeSet::new();
    let mut types: Vec<(AnimeType, usize)> = Vec::new();
    let mut sources: Vec<(String, usize)> = Vec::new();
    let mut total_score = 0.0;
    let mut total_popularity = 0.0;
    let mut episode_counts: Vec<f64> = Vec::new();

    for seed in seeds {
        genres.extend(seed.genres.iter().cloned());
        studios.extend(seed.studios.iter().cloned());
        demographics.extend(seed.demographics.iter().cloned());

        if let Some(anime_type) = &seed.anime_type {
            tally(&mut types, anime_type);
        }
        if let Some(source) = &seed.source {
            tally(&mut sources, source);
        }

        total_score += seed.score.unwrap_or(0.0);
        total_popularity += f64::from(seed.popularity.unwrap_or(0));

        if let Some(episodes) = seed.episodes.filter(|e| *e > 0) {
            episode_counts.push(f64::from(episodes));
        }
    }

    let seed_count = seeds.len() as f64;
    let mean_episodes = if episode_counts.is_empty() {
        f64::from(DEFAULT_EPISODES)
    } else {
        episode_counts.iter().sum::<f64>() / episode_counts.len() as f64
    };

    Some(FeatureVector {
        genres,
        studios,
        demographics,
        anime_type: most_frequent(types).unwrap_or(AnimeType::Tv),
        source: most_frequent(sources).unwrap_or_else(|| DEFAULT_PROFILE_SOURCE.to_string()),
        score: total_score / seed_count,
        popularity: total_popularity / seed_count,
        episode_bucket: EpisodeBucket::from_episodes(mean_episodes),
    })
}

/// Counts in first-seen order so ties resolve deterministically
fn tally<T: PartialEq + Clone>(counts: &mut Vec<(T, usize)>, value: &T) {
    match counts.iter_mut().find(|(seen, _)| seen == value) {
        Some((_, count)) => *count += 1,
        None => counts.push((value.clone(), 1)),
    }
}

fn most_frequent<T>(counts: Vec<(T, usize)>) -> Option<T> {
    let mut best: Option<(T, usize)> = None;
    for (value, count) in counts {
        if best.as_ref().map_or(true, |(_, best_count)| count > *best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}
