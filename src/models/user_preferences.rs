use serde::{Deserialize, Serialize};

/// Content rating ceiling requested by the user
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ContentRatingFilter {
    /// No rating-based filtering
    #[default]
    #[serde(rename = "all", alias = "show_all")]
    ShowAll,
    /// Drops the two most restrictive tiers (R+ and Rx)
    #[serde(rename = "teen", alias = "teen_and_under")]
    TeenAndUnder,
    /// Drops only the most restrictive tier (Rx)
    #[serde(rename = "no_nsfw", alias = "no_adult")]
    NoAdult,
}

/// Preferred series length bucket
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EpisodeLength {
    #[default]
    Any,
    #[serde(alias = "< 15 min")]
    Short,
    #[serde(alias = "15-30 min")]
    Medium,
    #[serde(alias = "> 30 min")]
    Long,
}

/// Per-request user preferences, passed by value into every recommendation call
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserPreferences {
    /// Genres that earn a bonus when present on a candidate
    pub preferred_genres: Vec<String>,
    /// Genres that exclude a candidate outright (case-insensitive)
    pub avoid_genres: Vec<String>,
    pub content_rating_filter: ContentRatingFilter,
    pub preferred_episode_length: EpisodeLength,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_uses_defaults() {
        let prefs: UserPreferences = serde_json::from_str("{}").unwrap();
        assert_eq!(prefs, UserPreferences::default());
        assert_eq!(prefs.content_rating_filter, ContentRatingFilter::ShowAll);
        assert_eq!(prefs.preferred_episode_length, EpisodeLength::Any);
    }

    #[test]
    fn test_legacy_labels_are_accepted() {
        let prefs: UserPreferences = serde_json::from_str(
            r#"{"content_rating_filter": "teen", "preferred_episode_length": "< 15 min"}"#,
        )
        .unwrap();
        assert_eq!(prefs.content_rating_filter, ContentRatingFilter::TeenAndUnder);
        assert_eq!(prefs.preferred_episode_length, EpisodeLength::Short);

        let prefs: UserPreferences = serde_json::from_str(
            r#"{"content_rating_filter": "no_adult", "preferred_episode_length": "> 30 min"}"#,
        )
        .unwrap();
        assert_eq!(prefs.content_rating_filter, ContentRatingFilter::NoAdult);
        assert_eq!(prefs.preferred_episode_length, EpisodeLength::Long);
    }

    #[test]
    fn test_serialization_uses_canonical_labels() {
        let json = serde_json::to_string(&ContentRatingFilter::NoAdult).unwrap();
        assert_eq!(json, "\"no_nsfw\"");
        let json = serde_json::to_string(&EpisodeLength::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }
}
