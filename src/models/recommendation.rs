use serde::{Deserialize, Serialize};

use super::Anime;

/// One ranked, explained recommendation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResult {
    pub anime: Anime,
    /// Compatibility score, 0-100
    pub score: f64,
    /// At most two human-readable justifications, most specific first
    pub reasons: Vec<String>,
    /// Decorative external mention count; never part of the score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mention_count: Option<u32>,
}
