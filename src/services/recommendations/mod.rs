//! Content-based recommendation pipeline with a collaborative boost.
//!
//! Stages, in order: seed resolution, taste profile, candidate pool, filtering,
//! scoring, ranking and explanation. Each stage lives in its own module; the
//! [`RecommendationEngine`] wires them together.

pub mod collaborative;
pub mod engine;
pub mod enrichment;
pub mod explain;
pub mod features;
pub mod filter;
pub mod profile;
pub mod scorer;

pub use collaborative::{CoOccurrence, CollaborativeBooster};
pub use engine::{EngineSettings, RecommendationEngine, Stage};
pub use enrichment::ResultEnricher;
pub use features::{EpisodeBucket, FeatureVector};
pub use profile::TasteProfile;
