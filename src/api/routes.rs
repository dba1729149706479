use crate::api::{handlers, AppState};
use crate::websocket::websocket_handler;
use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .route("/health/live", get(handlers::health_check))
        .route("/health/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        // Search
        .route("/v1/query", put(handlers::set_query).get(handlers::get_query))
        .route("/v1/results", get(handlers::get_results))
        .route("/v1/dataset", put(handlers::replace_dataset).get(handlers::get_dataset))
        // Streaming
        .route("/ws", get(websocket_handler))
        // Add state
        .with_state(state)
        // Add middleware
        .layer(middleware::from_fn(handlers::track_requests))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
