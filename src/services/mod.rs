pub mod catalog;
pub mod providers;
pub mod recommendations;

pub use catalog::Catalog;
pub use recommendations::RecommendationEngine;
