//! Storegate gateway server entry point

use storegate_gateway::{routes, AppState, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration - fail fast if invalid
    let config = Config::from_env()?;
    tracing::info!(
        primary_domain = %config.primary_domain,
        environment = ?config.environment,
        "Starting storegate gateway"
    );

    let bind_address = config.bind_address.clone();
    let state = AppState::new(config)?;

    // Periodic sweep of cache entries past their grace window; LRU eviction
    // only runs at capacity, so dead tenants would otherwise linger.
    let sweeper = state.resolver.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            tick.tick().await;
            sweeper.cache().cleanup();
        }
    });

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %bind_address, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}
