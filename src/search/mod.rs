//! Debounced, reactive search over an in-memory dataset
//!
//! This module turns a rapidly changing stream of query edits into a stable,
//! filtered result plus a busy indicator:
//!
//! - **Debounce**: a query is processed only once it has been stable for the
//!   configured quiet period
//! - **Blank passthrough**: empty or whitespace-only queries publish the whole
//!   dataset without any processing delay
//! - **Supersession**: a newer edit cancels the computation in flight; a
//!   stale result is never published
//! - **Pluggable policy**: matching goes through [`RecordMatcher`] and the
//!   computation through [`SearchBackend`]
//!
//! # Architecture
//!
//! ```text
//! set_query ──► watch<String> ──┐
//!                               ├──► worker: debounce ─► begin ─► backend ─► publish
//! replace_dataset ► watch<Dataset> ┘                                           │
//!                                                                              ▼
//!                                   watch<SearchSnapshot> (results + is_searching)
//!                                   broadcast<SearchFailure>
//! ```
//!
//! # Example
//!
//! ```no_run
//! use debounced_search::models::{Dataset, Person};
//! use debounced_search::search::{SearchConfigBuilder, SearchPipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dataset = Dataset::new(vec![
//!         Person::new("Tarek", "Hendi"),
//!         Person::new("Omar", "Hendi"),
//!     ]);
//!     let config = SearchConfigBuilder::new().debounce_ms(300).build();
//!
//!     let pipeline = SearchPipeline::new(dataset, config)?;
//!     pipeline.start()?;
//!     pipeline.set_query("th");
//!
//!     pipeline.dispose().await;
//!     Ok(())
//! }
//! ```

mod backend;
mod config;
mod error;
mod matcher;
mod pipeline;

pub use backend::{InMemoryBackend, SearchBackend};
pub use config::{SearchConfig, SearchConfigBuilder};
pub use error::{SearchError, SearchResult};
pub use matcher::{FnMatcher, NameCombinationMatcher, RecordMatcher};
pub use pipeline::{SearchFailure, SearchPipeline, SearchSnapshot};
