//! Debounced search pipeline
//!
//! A single worker task owns every write to the published [`SearchSnapshot`].
//! Query edits restart the debounce timer and cancel any computation still in
//! flight, so only the computation started from the latest accepted query can
//! publish. Each accepted query is tagged with a generation number that is
//! re-checked before publication.

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, trace, warn};

use super::backend::{InMemoryBackend, SearchBackend};
use super::config::SearchConfig;
use super::error::{SearchError, SearchResult};
use crate::metrics::{
    QUERY_UPDATES_TOTAL, SEARCH_COMPUTATIONS_TOTAL, SEARCH_DURATION_SECONDS,
    SEARCH_FAILURES_TOTAL, SEARCH_PIPELINES_ACTIVE, SEARCH_SUPERSEDED_TOTAL,
};
use crate::models::{Dataset, Person};

/// Published state of a pipeline
///
/// `results` and `is_searching` always change together, so a reader never
/// sees a result paired with the busy flag of a different computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSnapshot {
    /// Generation of the computation that produced `results` (0 = initial dataset)
    pub generation: u64,

    /// Query that produced `results`
    pub query: String,

    /// Matching records, in dataset order
    pub results: Arc<[Person]>,

    /// Whether a computation for the latest accepted query is pending
    pub is_searching: bool,

    pub published_at: DateTime<Utc>,
}

impl SearchSnapshot {
    fn initial(dataset: &Dataset) -> Self {
        Self {
            generation: 0,
            query: String::new(),
            results: dataset.people(),
            is_searching: false,
            published_at: Utc::now(),
        }
    }

    pub fn result_count(&self) -> usize {
        self.results.len()
    }
}

/// A backend failure reported on the failure side-channel
#[derive(Debug, Clone)]
pub struct SearchFailure {
    pub generation: u64,
    pub query: String,
    pub error: SearchError,
    pub occurred_at: DateTime<Utc>,
}

enum Lifecycle {
    Created(PipelineWorker),
    Running(JoinHandle<()>),
    Disposed,
}

/// Debounced, supersession-safe search over an in-memory dataset
///
/// # Example
///
/// ```no_run
/// use debounced_search::models::{Dataset, Person};
/// use debounced_search::search::{SearchConfig, SearchPipeline};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let dataset = Dataset::new(vec![Person::new("Omar", "Hendi")]);
/// let pipeline = SearchPipeline::new(dataset, SearchConfig::default())?;
/// pipeline.start()?;
///
/// pipeline.set_query("Om");
/// let mut updates = pipeline.subscribe();
/// while updates.changed().await.is_ok() {
///     let snapshot = updates.borrow_and_update().clone();
///     if !snapshot.is_searching && snapshot.query == "Om" {
///         println!("{} matches", snapshot.result_count());
///         break;
///     }
/// }
///
/// pipeline.dispose().await;
/// # Ok(())
/// # }
/// ```
pub struct SearchPipeline {
    config: SearchConfig,
    backend_name: &'static str,
    query_tx: watch::Sender<String>,
    dataset_tx: watch::Sender<Dataset>,
    snapshot_tx: Arc<watch::Sender<SearchSnapshot>>,
    failures_tx: broadcast::Sender<SearchFailure>,
    shutdown_tx: watch::Sender<bool>,
    lifecycle: Mutex<Lifecycle>,
}

impl SearchPipeline {
    /// Create a pipeline backed by the in-memory matcher
    pub fn new(dataset: Dataset, config: SearchConfig) -> SearchResult<Self> {
        let backend = Arc::new(InMemoryBackend::new(config.processing_delay()));
        Self::with_backend(dataset, config, backend)
    }

    /// Create a pipeline with a custom search backend
    pub fn with_backend(
        dataset: Dataset,
        config: SearchConfig,
        backend: Arc<dyn SearchBackend>,
    ) -> SearchResult<Self> {
        config.validate()?;

        let (query_tx, query_rx) = watch::channel(String::new());
        let (dataset_tx, dataset_rx) = watch::channel(dataset.clone());
        let (snapshot_tx, _) = watch::channel(SearchSnapshot::initial(&dataset));
        let snapshot_tx = Arc::new(snapshot_tx);
        let (failures_tx, _) = broadcast::channel(config.failure_channel_capacity);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let worker = PipelineWorker {
            backend: Arc::clone(&backend),
            debounce: config.debounce(),
            query_rx,
            dataset_rx,
            shutdown_rx,
            snapshot_tx: Arc::clone(&snapshot_tx),
            failures_tx: failures_tx.clone(),
            generation: 0,
            committed_query: String::new(),
        };

        Ok(Self {
            config,
            backend_name: backend.name(),
            query_tx,
            dataset_tx,
            snapshot_tx,
            failures_tx,
            shutdown_tx,
            lifecycle: Mutex::new(Lifecycle::Created(worker)),
        })
    }

    /// Spawn the worker task. Must be called from within a tokio runtime.
    pub fn start(&self) -> SearchResult<()> {
        let mut lifecycle = self.lifecycle.lock();

        match std::mem::replace(&mut *lifecycle, Lifecycle::Disposed) {
            Lifecycle::Created(worker) => {
                *lifecycle = Lifecycle::Running(tokio::spawn(worker.run()));
                SEARCH_PIPELINES_ACTIVE.inc();

                info!(
                    backend = self.backend_name,
                    debounce_ms = self.config.debounce_ms,
                    processing_delay_ms = self.config.processing_delay_ms,
                    records = self.dataset_tx.borrow().len(),
                    "Search pipeline started"
                );
                Ok(())
            }
            running @ Lifecycle::Running(_) => {
                *lifecycle = running;
                Err(SearchError::AlreadyStarted)
            }
            Lifecycle::Disposed => Err(SearchError::Disposed),
        }
    }

    /// Stop the worker, cancel pending timers and computations.
    ///
    /// Once this returns, the snapshot is never written again.
    pub async fn dispose(&self) {
        let previous = std::mem::replace(&mut *self.lifecycle.lock(), Lifecycle::Disposed);

        match previous {
            Lifecycle::Running(handle) => {
                let _ = self.shutdown_tx.send(true);
                if let Err(e) = handle.await {
                    if !e.is_cancelled() {
                        warn!(error = %e, "Search pipeline worker ended abnormally");
                    }
                }
                SEARCH_PIPELINES_ACTIVE.dec();
                info!("Search pipeline disposed");
            }
            Lifecycle::Created(_) => {
                debug!("Search pipeline disposed before it was started");
            }
            Lifecycle::Disposed => {
                debug!("Search pipeline already disposed");
            }
        }
    }

    /// Record the newest query text. Never fails; after disposal it has no effect.
    pub fn set_query(&self, text: impl Into<String>) {
        let text = text.into();

        if self.is_disposed() {
            debug!(query = %text, "Ignoring query for disposed search pipeline");
            return;
        }

        QUERY_UPDATES_TOTAL.inc();
        self.query_tx.send_if_modified(|current| {
            if *current == text {
                false
            } else {
                *current = text;
                true
            }
        });
    }

    /// Replace the dataset; the last accepted query is re-run without debounce
    pub fn replace_dataset(&self, dataset: Dataset) {
        if self.is_disposed() {
            debug!("Ignoring dataset for disposed search pipeline");
            return;
        }

        info!(records = dataset.len(), "Replacing search dataset");
        self.dataset_tx.send_replace(dataset);
    }

    /// Latest raw query text, which may not have been processed yet
    pub fn current_query(&self) -> String {
        self.query_tx.borrow().clone()
    }

    pub fn dataset(&self) -> Dataset {
        self.dataset_tx.borrow().clone()
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Last published result
    pub fn current_result(&self) -> Arc<[Person]> {
        Arc::clone(&self.snapshot_tx.borrow().results)
    }

    pub fn is_searching(&self) -> bool {
        self.snapshot_tx.borrow().is_searching
    }

    /// Receiver for every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Stream of results, starting with the current one and yielding only
    /// when the result list changes
    pub fn results_stream(&self) -> impl Stream<Item = Arc<[Person]>> + Send + 'static {
        let mut last: Option<Arc<[Person]>> = None;

        WatchStream::new(self.subscribe()).filter_map(move |snapshot| {
            let item = if last.as_ref() != Some(&snapshot.results) {
                last = Some(Arc::clone(&snapshot.results));
                Some(snapshot.results)
            } else {
                None
            };
            futures::future::ready(item)
        })
    }

    /// Stream of the busy flag, starting with the current value and
    /// yielding only on transitions
    pub fn searching_stream(&self) -> impl Stream<Item = bool> + Send + 'static {
        let mut last: Option<bool> = None;

        WatchStream::new(self.subscribe()).filter_map(move |snapshot| {
            let item = if last != Some(snapshot.is_searching) {
                last = Some(snapshot.is_searching);
                Some(snapshot.is_searching)
            } else {
                None
            };
            futures::future::ready(item)
        })
    }

    /// Receiver for backend failures
    pub fn subscribe_failures(&self) -> broadcast::Receiver<SearchFailure> {
        self.failures_tx.subscribe()
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        matches!(*self.lifecycle.lock(), Lifecycle::Running(_))
    }

    pub fn is_disposed(&self) -> bool {
        matches!(*self.lifecycle.lock(), Lifecycle::Disposed)
    }
}

impl Drop for SearchPipeline {
    fn drop(&mut self) {
        if let Lifecycle::Running(handle) = &*self.lifecycle.get_mut() {
            handle.abort();
            SEARCH_PIPELINES_ACTIVE.dec();
        }
    }
}

/// A non-blank search that has been accepted but not yet published
struct InFlight {
    generation: u64,
    query: String,
    started: Instant,
    future: BoxFuture<'static, SearchResult<Vec<Person>>>,
}

struct PipelineWorker {
    backend: Arc<dyn SearchBackend>,
    debounce: Duration,
    query_rx: watch::Receiver<String>,
    dataset_rx: watch::Receiver<Dataset>,
    shutdown_rx: watch::Receiver<bool>,
    snapshot_tx: Arc<watch::Sender<SearchSnapshot>>,
    failures_tx: broadcast::Sender<SearchFailure>,
    generation: u64,
    committed_query: String,
}

impl PipelineWorker {
    async fn run(mut self) {
        debug!(backend = self.backend.name(), "Search pipeline worker running");

        let mut debounce_deadline: Option<Instant> = None;
        let mut in_flight: Option<InFlight> = None;

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.changed() => break,

                changed = self.query_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let query = self.query_rx.borrow_and_update().clone();
                    trace!(query = %query, "Query changed, debounce restarted");
                    debounce_deadline = Some(Instant::now() + self.debounce);

                    if let Some(flight) = in_flight.take() {
                        self.supersede(flight, "query_changed");
                        self.mark_idle();
                    }
                }

                changed = self.dataset_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let dataset = self.dataset_rx.borrow_and_update().clone();
                    let query = self.committed_query.clone();

                    if let Some(flight) = in_flight.take() {
                        self.supersede(flight, "dataset_replaced");
                    }
                    in_flight = self.begin(query, dataset);
                }

                _ = wait_until(debounce_deadline) => {
                    debounce_deadline = None;
                    let query = self.query_rx.borrow_and_update().clone();
                    let dataset = self.dataset_rx.borrow().clone();

                    if let Some(flight) = in_flight.take() {
                        self.supersede(flight, "query_accepted");
                    }
                    in_flight = self.begin(query, dataset);
                }

                outcome = next_outcome(&mut in_flight) => {
                    if let Some(flight) = in_flight.take() {
                        self.complete(flight, outcome);
                    }
                }
            }
        }

        debug!(generation = self.generation, "Search pipeline worker stopped");
    }

    /// Accept `query` for processing against `dataset`.
    ///
    /// Blank queries publish the whole dataset immediately and return `None`.
    fn begin(&mut self, query: String, dataset: Dataset) -> Option<InFlight> {
        self.generation += 1;
        let generation = self.generation;
        self.committed_query = query.clone();

        self.snapshot_tx.send_modify(|snapshot| snapshot.is_searching = true);

        if query.trim().is_empty() {
            SEARCH_COMPUTATIONS_TOTAL.with_label_values(&["blank"]).inc();
            debug!(generation, records = dataset.len(), "Blank query, publishing full dataset");
            self.publish(generation, query, dataset.people());
            return None;
        }

        SEARCH_COMPUTATIONS_TOTAL.with_label_values(&["filtered"]).inc();
        debug!(generation, query = %query, backend = self.backend.name(), "Search started");

        let backend = Arc::clone(&self.backend);
        let search_query = query.clone();
        let future = Box::pin(async move { backend.search(&dataset, &search_query).await });

        Some(InFlight {
            generation,
            query,
            started: Instant::now(),
            future,
        })
    }

    fn complete(&mut self, flight: InFlight, outcome: SearchResult<Vec<Person>>) {
        if flight.generation != self.generation {
            SEARCH_SUPERSEDED_TOTAL.inc();
            debug!(
                generation = flight.generation,
                current = self.generation,
                "Discarding stale search result"
            );
            return;
        }

        let backend = self.backend.name();
        let elapsed = flight.started.elapsed();
        SEARCH_DURATION_SECONDS
            .with_label_values(&[backend])
            .observe(elapsed.as_secs_f64());

        match outcome {
            Ok(matched) => {
                debug!(
                    generation = flight.generation,
                    query = %flight.query,
                    matched = matched.len(),
                    duration_ms = elapsed.as_millis() as u64,
                    "Search completed"
                );
                self.publish(flight.generation, flight.query, matched.into());
            }
            Err(error) => {
                SEARCH_FAILURES_TOTAL.with_label_values(&[backend]).inc();
                warn!(
                    generation = flight.generation,
                    query = %flight.query,
                    error = %error,
                    recoverable = error.is_recoverable(),
                    "Search failed, keeping previous result"
                );

                self.mark_idle();
                // No receivers is fine; failures are advisory.
                let _ = self.failures_tx.send(SearchFailure {
                    generation: flight.generation,
                    query: flight.query,
                    error,
                    occurred_at: Utc::now(),
                });
            }
        }
    }

    fn supersede(&self, flight: InFlight, reason: &'static str) {
        SEARCH_SUPERSEDED_TOTAL.inc();
        debug!(
            generation = flight.generation,
            query = %flight.query,
            reason,
            "Search superseded"
        );
    }

    fn publish(&self, generation: u64, query: String, results: Arc<[Person]>) {
        self.snapshot_tx.send_replace(SearchSnapshot {
            generation,
            query,
            results,
            is_searching: false,
            published_at: Utc::now(),
        });
    }

    fn mark_idle(&self) {
        self.snapshot_tx.send_if_modified(|snapshot| {
            let was_searching = snapshot.is_searching;
            snapshot.is_searching = false;
            was_searching
        });
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn next_outcome(in_flight: &mut Option<InFlight>) -> SearchResult<Vec<Person>> {
    match in_flight {
        Some(flight) => flight.future.as_mut().await,
        None => std::future::pending().await,
    }
}
