//! Query configuration and engine settings
//!
//! - `query`: the canonical per-call input (`QueryConfig`, `RecordConstraint`,
//!   `RangeBound`, `SetFilter`)
//! - `settings`: process-level knobs loaded from versioned YAML (`FilterSettings`)

pub mod error;
pub mod query;
pub mod settings;

// Re-exports
pub use error::{ConfigError, ConfigResult};
pub use query::{grade_to_enrollment, QueryConfig, RangeBound, RecordConstraint, SetFilter};
pub use settings::{
    FilterSettings, DEFAULT_ENUMERATION_THRESHOLD, DEFAULT_GRADE_OFFSET,
    DEFAULT_MATERIALIZE_BATCH_SIZE, MAX_BOUND_UIDS,
};
