use super::collaborative::boost_note;
use crate::models::Anime;

pub const MAX_REASONS: usize = 2;
const HIGHLY_RATED_THRESHOLD: f64 = 8.0;
const FALLBACK_REASON: &str = "Matches your taste profile";

/// Up to two justifications for recommending `candidate`
///
/// Priority: collaborative note, then per seed (in seed order) a shared-genre
/// note when at least two genres match and a same-studio note, then a
/// highly-rated note, and finally a generic fallback when nothing else fired.
pub fn reasons(candidate: &Anime, seeds: &[Anime], co_occurrence: u32) -> Vec<String> {
    let mut reasons = Vec::with_capacity(MAX_REASONS);

    if co_occurrence > 0 {
        reasons.push(boost_note(co_occurrence));
    }

    for seed in seeds {
        if reasons.len() >= MAX_REASONS {
            break;
        }

        let shared_genres: Vec<&str> = candidate
            .genres
            .iter()
            .filter(|g| seed.genres.contains(g))
            .map(String::as_str)
            .collect();
        if shared_genres.len() >= 2 {
            reasons.push(format!(
                "Similar to {}: shares {}",
                seed.title,
                shared_genres.join(", ")
            ));
        }

        if candidate.studios.iter().any(|s| seed.studios.contains(s)) {
            reasons.push(format!("Made by the same studio as {}", seed.title));
        }
    }

    if candidate
        .score
        .is_some_and(|score| score >= HIGHLY_RATED_THRESHOLD)
    {
        reasons.push("Highly rated by the community".to_string());
    }

    if reasons.is_empty() {
        reasons.push(FALLBACK_REASON.to_string());
    }

    reasons.truncate(MAX_REASONS);
    reasons
}
