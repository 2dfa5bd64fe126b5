mod anime;
mod recommendation;
mod user_preferences;

pub use anime::*;
pub use recommendation::RecommendationResult;
pub use user_preferences::{ContentRatingFilter, EpisodeLength, UserPreferences};
