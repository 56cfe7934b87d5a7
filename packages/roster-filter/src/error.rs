//! Error types for roster-filter
//!
//! Every store failure reaches the caller exactly once, wrapped with the
//! evaluation stage that issued the lookup. Nothing is retried or swallowed;
//! an empty result is not an error.

use std::fmt;

use roster_storage::{ErrorKind, StorageError};
use thiserror::Error;

/// What went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterErrorKind {
    /// No store has been installed in the handle
    StoreUnavailable,
    /// A lookup failed at the store layer
    Execution,
}

impl FilterErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterErrorKind::StoreUnavailable => "store_unavailable",
            FilterErrorKind::Execution => "execution",
        }
    }
}

impl fmt::Display for FilterErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where it went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Acquiring the store from its handle
    Acquire,
    /// Enrollment-year lookup against the enrollee view
    BaseFilter,
    /// Lookup for the record constraint at this index
    Narrowing { constraint: usize },
    /// Fetching the final enrollee rows
    Materialize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Acquire => f.write_str("acquire"),
            Stage::BaseFilter => f.write_str("base filter"),
            Stage::Narrowing { constraint } => write!(f, "narrowing (record constraint #{})", constraint),
            Stage::Materialize => f.write_str("materialize"),
        }
    }
}

#[derive(Debug, Error)]
#[error("[{kind}] {stage} failed: {source}")]
pub struct FilterError {
    pub kind: FilterErrorKind,
    pub stage: Stage,
    #[source]
    pub source: StorageError,
}

impl FilterError {
    pub fn new(stage: Stage, source: StorageError) -> Self {
        let kind = match source.kind {
            ErrorKind::Unavailable => FilterErrorKind::StoreUnavailable,
            _ => FilterErrorKind::Execution,
        };
        Self {
            kind,
            stage,
            source,
        }
    }

    /// Adapter for `map_err`
    pub fn at(stage: Stage) -> impl FnOnce(StorageError) -> Self {
        move |source| Self::new(stage, source)
    }

    pub fn is_store_unavailable(&self) -> bool {
        self.kind == FilterErrorKind::StoreUnavailable
    }

    pub fn is_execution(&self) -> bool {
        self.kind == FilterErrorKind::Execution
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, FilterError>;
