//! roster-filter: read-only candidate filtering over a loaded roster
//!
//! Turns a [`QueryConfig`] (enrollee windows plus per-record constraints)
//! into the matching enrollees, ordered by aggregate score.
//!
//! ## Pipeline
//!
//! 1. **Base filter**: enrollment-year and grade windows → initial candidates
//!    (or "unconstrained", without a lookup)
//! 2. **Narrowing**: one distinct-uid lookup per record constraint, intersected;
//!    lookups are scoped to the candidates once fewer than
//!    `enumeration_threshold` remain; an empty set stops the loop
//! 3. **Materialization**: fetch the rows, order by score (ties by uid)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use roster_filter::{CandidateFilter, QueryConfig, RangeBound, RecordConstraint, SetFilter};
//! use roster_storage::{SqliteRosterStore, StoreHandle};
//!
//! let handle = StoreHandle::new(SqliteRosterStore::from_dataset(&dataset)?);
//! let config = QueryConfig::new()
//!     .grades(RangeBound::between(7, 9))
//!     .record(RecordConstraint::new().levels(SetFilter::of(["gold"])));
//!
//! let outcome = CandidateFilter::new(&handle).evaluate(&config)?;
//! for enrollee in &outcome.enrollees {
//!     println!("{} {}", enrollee.uid, enrollee.aggregate_score);
//! }
//! ```

pub mod base_filter;
pub mod candidates;
pub mod compiler;
pub mod config;
pub mod engine;
pub mod error;
pub mod materializer;
pub mod narrowing;
pub mod stats;

pub use candidates::CandidateSet;
pub use compiler::{compile, FieldKind, RecordField};
pub use config::{
    ConfigError, FilterSettings, QueryConfig, RangeBound, RecordConstraint, SetFilter,
};
pub use engine::{CandidateFilter, FilterOutcome};
pub use error::{FilterError, FilterErrorKind, Result, Stage};
pub use stats::FilterStats;
