//! Search backends
//!
//! A backend performs the expensive part of a search: everything between a
//! debounced query being accepted and its result being ready. The pipeline
//! only calls a backend for non-blank queries.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

use super::error::SearchResult;
use super::matcher::{NameCombinationMatcher, RecordMatcher};
use crate::models::{Dataset, Person};

#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Return the records of `dataset` matching `query`, in dataset order
    async fn search(&self, dataset: &Dataset, query: &str) -> SearchResult<Vec<Person>>;

    /// Name of the backend, used in logs
    fn name(&self) -> &'static str;
}

/// Filters the in-memory dataset with a [`RecordMatcher`] after a fixed
/// processing delay.
pub struct InMemoryBackend {
    matcher: Arc<dyn RecordMatcher>,
    processing_delay: Duration,
}

impl InMemoryBackend {
    pub fn new(processing_delay: Duration) -> Self {
        Self {
            matcher: Arc::new(NameCombinationMatcher),
            processing_delay,
        }
    }

    /// Replace the matching policy
    pub fn with_matcher(mut self, matcher: Arc<dyn RecordMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn processing_delay(&self) -> Duration {
        self.processing_delay
    }
}

#[async_trait]
impl SearchBackend for InMemoryBackend {
    async fn search(&self, dataset: &Dataset, query: &str) -> SearchResult<Vec<Person>> {
        if !self.processing_delay.is_zero() {
            tokio::time::sleep(self.processing_delay).await;
        }

        let matched = dataset.filter(|person| self.matcher.matches(person, query));

        trace!(
            matcher = self.matcher.name(),
            query = %query,
            matched = matched.len(),
            total = dataset.len(),
            "Filtered dataset"
        );

        Ok(matched)
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}
