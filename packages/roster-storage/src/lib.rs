//! roster-storage: read-only roster dataset behind a typed lookup port
//!
//! ## Core Principles
//!
//! 1. **Load once**: the dataset is imported once at startup and never mutated
//! 2. **Typed predicates**: lookups take a `Predicate` (bounds + membership), never raw SQL
//! 3. **Explicit handle**: the engine reads the store through a `StoreHandle`,
//!    which reports `Unavailable` until a store is installed
//!
//! ## Usage
//!
//! ```rust,ignore
//! use roster_storage::{Column, Condition, Dataset, Predicate, SqliteRosterStore, StoreHandle, View};
//!
//! let store = SqliteRosterStore::from_dataset(&dataset)?;
//! let handle = StoreHandle::empty();
//! handle.install(store)?;
//!
//! let predicate = Predicate::always()
//!     .and(Condition::at_least(Column::ContestYear, 2023))
//!     .and(Condition::one_of(Column::Level, ["gold"]));
//! let uids = handle.get()?.select_uids(View::RecordContest, &predicate)?;
//! ```

pub mod domain;
pub mod error;
pub mod infrastructure;

pub use error::{ErrorKind, Result, StorageError};

pub use domain::{
    BoundValue, CellRef, Column, Condition, Contest, ContestId, ContestRecord, Dataset, Enrollee,
    Gender, Predicate, RosterStore, RowSource, StoreHandle, StoreStats, Uid, ValueKind, View,
};

pub use infrastructure::MemoryRosterStore;
#[cfg(feature = "sqlite")]
pub use infrastructure::SqliteRosterStore;
