pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::error::Result;
use crate::search::SearchPipeline;
use crate::websocket::WebSocketConfig;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<SearchPipeline>,
    pub websocket: WebSocketConfig,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(pipeline: Arc<SearchPipeline>) -> Self {
        Self {
            pipeline,
            websocket: WebSocketConfig::default(),
            started_at: Instant::now(),
        }
    }

    /// Set the WebSocket configuration
    pub fn with_websocket(mut self, websocket: WebSocketConfig) -> Self {
        self.websocket = websocket;
        self
    }
}

/// Bind `addr` and serve the API until `shutdown` resolves
pub async fn serve<F>(addr: &str, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let app = build_router(state);

    tracing::info!("🚀 HTTP API server listening on http://{}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;

    Ok(())
}
