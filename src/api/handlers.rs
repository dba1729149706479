use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::metrics::{self, HTTP_REQUESTS_TOTAL};
use crate::models::{Dataset, Person};
use crate::search::{SearchError, SearchSnapshot};
use axum::{
    extract::{MatchedPath, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        pipeline_running: state.pipeline.is_running(),
    }))
}

/// Readiness check: ready only while the pipeline worker is running
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<HealthResponse>)> {
    let running = state.pipeline.is_running();
    let status = if running {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    Ok((
        status,
        Json(HealthResponse {
            status: if running { "ready" } else { "not_ready" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.started_at.elapsed().as_secs(),
            pipeline_running: running,
        }),
    ))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub pipeline_running: bool,
}

/// Prometheus text exposition
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::gather_metrics(),
    )
}

/// Record a raw query edit
///
/// Returns immediately; the result is published once the query has been
/// stable for the debounce interval.
pub async fn set_query(
    State(state): State<AppState>,
    Json(request): Json<SetQueryRequest>,
) -> Result<(StatusCode, Json<QueryResponse>)> {
    ensure_active(&state)?;

    state.pipeline.set_query(request.text);

    Ok((StatusCode::ACCEPTED, Json(query_response(&state))))
}

/// Latest raw query text and whether it has been processed
pub async fn get_query(State(state): State<AppState>) -> Json<QueryResponse> {
    Json(query_response(&state))
}

#[derive(Debug, Deserialize)]
pub struct SetQueryRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub text: String,
    pub committed_query: String,
    pub is_searching: bool,
}

fn query_response(state: &AppState) -> QueryResponse {
    let snapshot = state.pipeline.snapshot();
    QueryResponse {
        text: state.pipeline.current_query(),
        committed_query: snapshot.query,
        is_searching: snapshot.is_searching,
    }
}

/// Current published search state
pub async fn get_results(State(state): State<AppState>) -> Json<SearchSnapshot> {
    Json(state.pipeline.snapshot())
}

/// Replace the searchable dataset
pub async fn replace_dataset(
    State(state): State<AppState>,
    Json(request): Json<ReplaceDatasetRequest>,
) -> Result<Json<DatasetResponse>> {
    ensure_active(&state)?;

    let dataset = Dataset::new(request.people);
    let records = dataset.len();
    state.pipeline.replace_dataset(dataset);

    Ok(Json(DatasetResponse {
        records,
        people: None,
    }))
}

/// Current dataset
pub async fn get_dataset(State(state): State<AppState>) -> Json<DatasetResponse> {
    let dataset = state.pipeline.dataset();
    Json(DatasetResponse {
        records: dataset.len(),
        people: Some(dataset.into()),
    })
}

#[derive(Debug, Deserialize)]
pub struct ReplaceDatasetRequest {
    pub people: Vec<Person>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatasetResponse {
    pub records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub people: Option<Vec<Person>>,
}

fn ensure_active(state: &AppState) -> Result<()> {
    if state.pipeline.is_disposed() {
        return Err(AppError::from(SearchError::Disposed));
    }
    Ok(())
}

/// Count requests by matched route and status
pub async fn track_requests(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), path.as_str(), response.status().as_str()])
        .inc();

    response
}
