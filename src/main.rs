use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use binge_api::{
    config::Config,
    db::{
        create_pool, create_redis_client, run_migrations, Cache, PgMetadataStore,
        PgSavedListRepository,
    },
    routes::{create_router, AppState},
    services::{
        providers::{JikanProvider, ProviderSettings},
        recommendations::{CollaborativeBooster, EngineSettings},
        Catalog, RecommendationEngine,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("binge_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url, config.database_max_connections).await?;
    run_migrations(&pool).await?;

    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, cache_handle) = Cache::new(redis_client);

    let provider = JikanProvider::new(
        config.jikan_api_url.clone(),
        Some(cache),
        ProviderSettings::from(&config),
    )?;

    let catalog = Catalog::new(
        Arc::new(PgMetadataStore::new(pool.clone())),
        Arc::new(provider),
        config.cache_freshness_days,
    );
    let booster = CollaborativeBooster::new(Arc::new(PgSavedListRepository::new(pool)));
    let engine = RecommendationEngine::new(
        catalog.clone(),
        booster,
        EngineSettings {
            candidate_pool_size: config.candidate_pool_size,
            ..EngineSettings::default()
        },
    );

    let app = create_router(AppState::new(catalog, engine));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Flushing pending cache writes");
    cache_handle.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
