//! Store error types and result alias.
//!
//! These errors cover dataset ingestion only; queries against a loaded store
//! never fail. Out-of-range pagination degrades to empty or partial results,
//! and a lookup of an absent (or invisible) entity signals absence through
//! `Option`, not an error.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while loading a dataset.
///
/// Ingestion is all-or-nothing: the first malformed record fails the whole
/// load rather than being skipped.
///
/// # Non-exhaustive
///
/// This enum is marked `#[non_exhaustive]` — new variants may be added in
/// future minor releases without a semver-breaking change. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The dataset file does not exist.
    #[error("Dataset file not found: {}", path.display())]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// The dataset file could not be read.
    #[error("Failed to read dataset {}", path.display())]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A record in the dataset could not be parsed.
    #[error("Malformed dataset: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Two records of the same kind share an id.
    #[error("Duplicate {kind} id: {id}")]
    DuplicateId {
        /// Entity kind name (e.g., "type", "field").
        kind: &'static str,
        /// The duplicated id.
        id: String,
    },
}

impl StoreError {
    /// Creates a new `DuplicateId` error.
    #[must_use]
    pub fn duplicate_id(kind: &'static str, id: impl Into<String>) -> Self {
        Self::DuplicateId { kind, id: id.into() }
    }
}
