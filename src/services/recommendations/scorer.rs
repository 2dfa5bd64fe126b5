//! Interpretable linear compatibility model.
//!
//! Every term is a fixed, human-explainable weight so a ranking can always be
//! traced back to concrete overlaps. No training data is involved.

use std::collections::BTreeSet;

use super::{features::FeatureVector, profile::TasteProfile};
use crate::models::UserPreferences;

const GENRE_OVERLAP_WEIGHT: f64 = 40.0;
const PREFERRED_GENRE_WEIGHT: f64 = 15.0;
const STUDIO_MATCH_POINTS: f64 = 10.0;
const DEMOGRAPHIC_MATCH_POINTS: f64 = 10.0;
const TYPE_MATCH_POINTS: f64 = 5.0;
const SOURCE_MATCH_POINTS: f64 = 5.0;
const SCORE_PROXIMITY_MAX: f64 = 10.0;
const POPULARITY_BONUS_MAX: f64 = 5.0;
const POPULARITY_DIVISOR: f64 = 1000.0;

pub const MAX_SCORE: f64 = 100.0;

/// Intersection over union; two empty sets have similarity 0
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

fn shares_any(a: &BTreeSet<String>, b: &BTreeSet<String>) -> bool {
    !a.is_disjoint(b)
}

/// Compatibility of one candidate with the taste profile, in [0, 100]
pub fn score(profile: &TasteProfile, features: &FeatureVector, preferences: &UserPreferences) -> f64 {
    let mut terms = [0.0_f64; 8];

    terms[0] = jaccard(&profile.genres, &features.genres) * GENRE_OVERLAP_WEIGHT;

    if !preferences.preferred_genres.is_empty() {
        let matches = preferences
            .preferred_genres
            .iter()
            .filter(|g| features.genres.contains(g.as_str()))
            .count();
        terms[1] =
            matches as f64 / preferences.preferred_genres.len() as f64 * PREFERRED_GENRE_WEIGHT;
    }

    if shares_any(&profile.studios, &features.studios) {
        terms[2] = STUDIO_MATCH_POINTS;
    }
    if shares_any(&profile.demographics, &features.demographics) {
        terms[3] = DEMOGRAPHIC_MATCH_POINTS;
    }
    if profile.anime_type == features.anime_type {
        terms[4] = TYPE_MATCH_POINTS;
    }
    if profile.source == features.source {
        terms[5] = SOURCE_MATCH_POINTS;
    }

    terms[6] = SCORE_PROXIMITY_MAX - (profile.score - features.score).abs();
    terms[7] = POPULARITY_BONUS_MAX - features.popularity / POPULARITY_DIVISOR;

    let total: f64 = terms.iter().map(|t| t.max(0.0)).sum();
    total.clamp(0.0, MAX_SCORE)
}
