use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use papergum::aggregator::Aggregator;
use papergum::cache::{start_background_refresh, NewsCache};
use papergum::config::Config;
use papergum::routes::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "papergum=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path =
        std::env::var("PAPERGUM_CONFIG").unwrap_or_else(|_| "papergum.toml".to_string());
    let config = Config::load_or_default(&config_path)?;
    info!(
        "Loaded {} sources (cache TTL {}s)",
        config.sources.len(),
        config.cache_ttl_secs
    );

    let aggregator = Arc::new(Aggregator::new(&config)?);
    let cache = Arc::new(
        NewsCache::new(aggregator.clone(), config.cache_ttl())
            .with_coalescing(config.coalesce_refreshes),
    );

    if let Some(interval) = config.warm_interval_minutes {
        let bg_cache = cache.clone();
        tokio::spawn(async move {
            start_background_refresh(bg_cache, interval).await;
        });
    }

    let state = Arc::new(AppState { cache, aggregator });
    let app = routes::router(state, &config.cors_origins);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Server starting on http://{}", config.bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
