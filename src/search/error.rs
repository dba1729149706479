//! Error types for search operations

use crate::error::AppError;

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors that can occur during search operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The search backend could not serve the query; the last good result is kept
    #[error("Search backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The backend rejected the query text
    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    /// `start` was called on a running pipeline
    #[error("Search pipeline already started")]
    AlreadyStarted,

    /// The pipeline has been disposed
    #[error("Search pipeline disposed")]
    Disposed,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl SearchError {
    /// Whether retrying the same query later may succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SearchError::BackendUnavailable(_))
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidConfiguration(msg) => AppError::Configuration(msg),
            SearchError::AlreadyStarted => AppError::InvalidStateTransition(err.to_string()),
            SearchError::Disposed | SearchError::BackendUnavailable(_) => {
                AppError::Unavailable(err.to_string())
            }
            SearchError::MalformedQuery(msg) => AppError::Validation(msg),
        }
    }
}
