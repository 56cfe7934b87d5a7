//! Candidate filter facade
//!
//! ```text
//! QueryConfig ─▶ BaseEntityFilter ─▶ NarrowingEngine ─▶ ResultMaterializer ─▶ Vec<Enrollee>
//!                  (enrollees view)   (record ⋈ contest)   (enrollees view)
//! ```
//!
//! One call to [`CandidateFilter::evaluate`] is one stateless evaluation: all
//! intermediate sets live on the stack of that call and nothing is cached
//! between calls.

use roster_storage::{Enrollee, StoreHandle};
use serde::Serialize;
use tracing::info;

use crate::base_filter::BaseEntityFilter;
use crate::config::{ConfigResult, FilterSettings, QueryConfig};
use crate::error::{FilterError, Result, Stage};
use crate::materializer::ResultMaterializer;
use crate::narrowing::NarrowingEngine;
use crate::stats::FilterStats;

/// Result of one evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOutcome {
    /// Matching enrollees, highest aggregate score first
    pub enrollees: Vec<Enrollee>,
    /// The configuration actually evaluated (grades folded into years,
    /// empty set filters collapsed), for audit and display
    pub normalized: QueryConfig,
    pub stats: FilterStats,
}

impl FilterOutcome {
    pub fn uids(&self) -> Vec<&str> {
        self.enrollees.iter().map(|e| e.uid.as_str()).collect()
    }
}

/// Read-only candidate filtering engine bound to a store handle
#[derive(Debug)]
pub struct CandidateFilter<'h> {
    handle: &'h StoreHandle,
    settings: FilterSettings,
}

impl<'h> CandidateFilter<'h> {
    pub fn new(handle: &'h StoreHandle) -> Self {
        Self {
            handle,
            settings: FilterSettings::default(),
        }
    }

    /// Bind `settings`, rejecting any that fail [`FilterSettings::validate`]
    pub fn with_settings(handle: &'h StoreHandle, settings: FilterSettings) -> ConfigResult<Self> {
        settings.validate()?;
        Ok(Self { handle, settings })
    }

    pub fn settings(&self) -> &FilterSettings {
        &self.settings
    }

    /// Evaluate `config` against the installed store
    ///
    /// # Errors
    ///
    /// - `StoreUnavailable` when no store is installed, before any work
    /// - `Execution` when a lookup fails, tagged with the failing stage
    pub fn evaluate(&self, config: &QueryConfig) -> Result<FilterOutcome> {
        let store = self.handle.get().map_err(FilterError::at(Stage::Acquire))?;
        let current_year = self.settings.resolve_current_year();
        let grade_offset = self.settings.grade_offset;
        let mut stats = FilterStats::default();

        let initial = BaseEntityFilter::new(store, current_year, grade_offset).run(config)?;
        if !initial.is_unconstrained() {
            stats.base_lookups += 1;
        }

        let candidates = NarrowingEngine::new(
            store,
            self.settings.enumeration_threshold,
            self.settings.materialize_batch_size,
        )
        .narrow(initial, &config.records, &mut stats)?;

        let enrollees = ResultMaterializer::new(store, self.settings.materialize_batch_size)
            .materialize(config.has_constraints(), &candidates, &mut stats)?;

        info!(
            constraints = config.records.len(),
            candidates = candidates.len().unwrap_or(enrollees.len()),
            results = enrollees.len(),
            lookups = stats.lookups(),
            short_circuited = stats.short_circuited,
            "candidate filter evaluated"
        );

        Ok(FilterOutcome {
            enrollees,
            normalized: config.normalize(current_year, grade_offset),
            stats,
        })
    }
}
