//! Debounced, reactive search over in-memory record lists
//!
//! The [`search::SearchPipeline`] turns a stream of raw query edits into a
//! stable, filtered result and a busy flag. The remaining modules serve that
//! pipeline over HTTP and WebSocket:
//!
//! - [`models`]: records and datasets
//! - [`search`]: the pipeline, matching policies and backends
//! - [`api`] / [`websocket`]: the consumer-facing surface
//! - [`config`], [`error`], [`metrics`]: configuration, errors, Prometheus metrics

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod search;
pub mod websocket;

pub use error::{AppError, Result};
