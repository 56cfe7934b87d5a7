//! Per-evaluation statistics

use serde::Serialize;

/// Lookup accounting for one evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterStats {
    /// Lookups against the enrollee view for the base windows (0 or 1)
    pub base_lookups: usize,
    /// Distinct-uid lookups against the record/contest view (one per batch
    /// when scoped)
    pub narrowing_lookups: usize,
    /// Narrowing lookups that were scoped to the current candidates
    pub scoped_lookups: usize,
    /// Enrollee row fetches
    pub materialize_lookups: usize,
    /// Record constraints actually evaluated
    pub constraints_evaluated: usize,
    /// Number of constraints processed when enumeration mode engaged
    /// (`Some(0)` means the base filter already produced a small set)
    pub enumeration_engaged_at: Option<usize>,
    /// The candidate set ended empty, so materialization was skipped along
    /// with any constraints after the one that emptied it
    pub short_circuited: bool,
}

impl FilterStats {
    /// Total store lookups issued
    pub fn lookups(&self) -> usize {
        self.base_lookups + self.narrowing_lookups + self.materialize_lookups
    }
}
