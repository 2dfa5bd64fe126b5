use crate::services::{Catalog, RecommendationEngine};

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub engine: RecommendationEngine,
}

impl AppState {
    pub fn new(catalog: Catalog, engine: RecommendationEngine) -> Self {
        Self { catalog, engine }
    }
}
