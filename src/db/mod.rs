pub mod metadata_store;
pub mod postgres;
pub mod redis;
pub mod saved_lists;

pub use metadata_store::{
    is_fresh, InMemoryMetadataStore, MetadataStore, PgMetadataStore, DEFAULT_FRESHNESS_DAYS,
};
pub use postgres::{create_pool, run_migrations};
pub use self::redis::create_redis_client;
pub use self::redis::Cache;
pub use self::redis::CacheKey;
pub use saved_lists::{
    InMemorySavedListRepository, PgSavedListRepository, SavedList, SavedListRepository,
};
