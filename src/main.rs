use debounced_search::{
    api::{self, AppState},
    config::Config,
    search::SearchPipeline,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "debounced_search={},tower_http=info",
            config.observability.log_level
        )
        .into()
    });
    let registry = tracing_subscriber::registry().with(filter);
    if config.observability.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    if let Some(e) = config_error {
        tracing::warn!("Failed to load configuration: {}", e);
        tracing::warn!("Using default configuration");
    }

    tracing::info!(
        "Starting {} v{}",
        config.observability.service_name,
        env!("CARGO_PKG_VERSION")
    );

    // Initialize Prometheus metrics
    if config.observability.prometheus_enabled {
        if let Err(e) = debounced_search::metrics::init_metrics() {
            tracing::warn!("Failed to initialize metrics: {}", e);
            tracing::warn!("Continuing without metrics");
        } else {
            tracing::info!("✅ Prometheus metrics initialized");
        }
    } else {
        tracing::info!("⚠️  Prometheus metrics disabled in configuration");
    }

    // Initialize search pipeline
    let dataset = config.dataset.to_dataset();
    tracing::info!(records = dataset.len(), "Loaded initial dataset");

    let pipeline = Arc::new(SearchPipeline::new(dataset, config.search.clone())?);
    pipeline.start()?;
    tracing::info!(
        debounce_ms = config.search.debounce_ms,
        processing_delay_ms = config.search.processing_delay_ms,
        "✅ Search pipeline started"
    );

    let state = AppState::new(pipeline.clone()).with_websocket(config.websocket.clone());
    let addr = config.server.bind_address();

    tracing::info!("   Health check: http://{}/health", addr);
    tracing::info!("   Query: PUT http://{}/v1/query", addr);
    tracing::info!("   Results: GET http://{}/v1/results", addr);
    tracing::info!("   WebSocket Streaming: ws://{}/ws", addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
        }
        tracing::info!("Shutdown signal received");
    };

    if let Err(e) = api::serve(&addr, state, shutdown).await {
        tracing::error!("HTTP server error: {}", e);
    }

    tracing::info!("Shutting down gracefully...");
    pipeline.dispose().await;
    Ok(())
}
