//! Common test utilities for pipeline and API testing

#![allow(dead_code)]

use async_trait::async_trait;
use debounced_search::models::{Dataset, Person};
use debounced_search::search::{
    InMemoryBackend, SearchBackend, SearchError, SearchPipeline, SearchResult, SearchSnapshot,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub const DEBOUNCE: Duration = Duration::from_millis(500);
pub const PROCESSING_DELAY: Duration = Duration::from_millis(500);

/// The five-person sample dataset
pub fn hendis() -> Dataset {
    ["Tarek", "Omar", "Ammar", "Nisreen", "Aya"]
        .into_iter()
        .map(|first| Person::new(first, "Hendi"))
        .collect()
}

pub fn first_names(people: &[Person]) -> Vec<&str> {
    people.iter().map(|p| p.first_name.as_str()).collect()
}

/// Wait until `query` has been processed and published
pub async fn settle(pipeline: &SearchPipeline, query: &str) -> SearchSnapshot {
    let mut updates = pipeline.subscribe();
    loop {
        {
            let snapshot = updates.borrow_and_update();
            if !snapshot.is_searching && snapshot.query == query {
                return snapshot.clone();
            }
        }
        updates
            .changed()
            .await
            .expect("pipeline stopped before the query settled");
    }
}

/// Delegates to the in-memory backend and records every query it is asked to run
pub struct RecordingBackend {
    inner: InMemoryBackend,
    calls: Mutex<Vec<String>>,
}

impl RecordingBackend {
    pub fn new(processing_delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            inner: InMemoryBackend::new(processing_delay),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl SearchBackend for RecordingBackend {
    async fn search(&self, dataset: &Dataset, query: &str) -> SearchResult<Vec<Person>> {
        self.calls.lock().push(query.to_string());
        self.inner.search(dataset, query).await
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Fails every query containing `trigger`, filters the rest in memory
pub struct FailingBackend {
    inner: InMemoryBackend,
    trigger: &'static str,
}

impl FailingBackend {
    pub fn new(trigger: &'static str, processing_delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            inner: InMemoryBackend::new(processing_delay),
            trigger,
        })
    }
}

#[async_trait]
impl SearchBackend for FailingBackend {
    async fn search(&self, dataset: &Dataset, query: &str) -> SearchResult<Vec<Person>> {
        if query.contains(self.trigger) {
            tokio::time::sleep(self.inner.processing_delay()).await;
            return Err(SearchError::BackendUnavailable(format!(
                "refusing to search for {:?}",
                query
            )));
        }
        self.inner.search(dataset, query).await
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Parse Prometheus exposition format into metric name -> lines
pub fn parse_prometheus_output(output: &str) -> HashMap<String, Vec<String>> {
    let mut metrics = HashMap::new();
    let mut current_metric = String::new();

    for line in output.lines() {
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with("# HELP") || line.starts_with("# TYPE") {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() >= 3 {
                current_metric = parts[2].to_string();
                metrics
                    .entry(current_metric.clone())
                    .or_insert_with(Vec::new)
                    .push(line.to_string());
            }
        } else if !line.starts_with('#') && !current_metric.is_empty() {
            metrics
                .entry(current_metric.clone())
                .or_insert_with(Vec::new)
                .push(line.to_string());
        }
    }

    metrics
}
