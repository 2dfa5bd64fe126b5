use std::collections::BTreeSet;

use crate::models::{Anime, AnimeType};

/// Episode count assumed when a record has none
pub const DEFAULT_EPISODES: u32 = 12;
/// Source category assumed when a record has none
pub const DEFAULT_SOURCE: &str = "Unknown";

/// Coarse series length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeBucket {
    /// Up to 13 episodes
    Short,
    /// 14 to 26 episodes
    Medium,
    /// More than 26 episodes
    Long,
}

impl EpisodeBucket {
    pub fn from_episodes(episodes: f64) -> Self {
        if episodes <= 13.0 {
            EpisodeBucket::Short
        } else if episodes <= 26.0 {
            EpisodeBucket::Medium
        } else {
            EpisodeBucket::Long
        }
    }
}

/// Comparable projection of one record, or of a whole seed set
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub genres: BTreeSet<String>,
    pub studios: BTreeSet<String>,
    pub demographics: BTreeSet<String>,
    pub anime_type: AnimeType,
    pub source: String,
    pub score: f64,
    pub popularity: f64,
    pub episode_bucket: EpisodeBucket,
}

/// Projects a record onto its features, substituting defaults for missing fields
pub fn extract(anime: &Anime) -> FeatureVector {
    FeatureVector {
        genres: anime.genres.iter().cloned().collect(),
        studios: anime.studios.iter().cloned().collect(),
        demographics: anime.demographics.iter().cloned().collect(),
        anime_type: anime.anime_type.clone().unwrap_or(AnimeType::Tv),
        source: anime
            .source
            .clone()
            .unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
        score: anime.score.unwrap_or(0.0),
        popularity: f64::from(anime.popularity.unwrap_or(0)),
        episode_bucket: EpisodeBucket::from_episodes(f64::from(
            anime.episodes.unwrap_or(DEFAULT_EPISODES),
        )),
    }
}
