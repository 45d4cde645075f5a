use anyhow::Context;
use tracing_subscriber::EnvFilter;

use cinematch_api::{
    api::{create_router, AppState},
    config::{Config, LogFormat},
    services::{load_catalog, JsonFileSource, Recommender},
};

const DEFAULT_LOG_FILTER: &str = "cinematch_api=info,tower_http=info";

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Pretty => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    // Refuse to serve traffic without a catalog
    let source = JsonFileSource::new(&config.catalog_path);
    let catalog = load_catalog(&source)
        .await
        .with_context(|| format!("Cannot start without a catalog ({})", config.catalog_path))?;

    let recommender = Recommender::new(catalog, config.ranking, config.runtime_table());
    let address = config.bind_address();
    let state = AppState::new(recommender, config);

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
