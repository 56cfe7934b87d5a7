//! Roster Store Port (Trait Interface)
//!
//! Port/Adapter pattern for backend flexibility:
//! - Default: SQLite (`SqliteRosterStore`)
//! - Testing: InMemory (`MemoryRosterStore`)
//!
//! The store is read-only from the engine's point of view. It is installed
//! once into a [`StoreHandle`] and every lookup goes through that handle, so an
//! engine that runs before installation fails with `ErrorKind::Unavailable`
//! instead of observing an empty dataset.

use std::collections::BTreeSet;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::models::{Enrollee, Uid};
use super::predicate::{Predicate, View};
use crate::{Result, StorageError};

/// Row counts of the loaded dataset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub enrollees: usize,
    pub contests: usize,
    pub records: usize,
}

/// Roster Store Port (Primary Interface)
///
/// All storage backends must implement this trait. Implementations must not
/// hold any per-query resource past the return of a call.
pub trait RosterStore: Send + Sync {
    /// Distinct uids of the rows in `view` matching `predicate`
    ///
    /// # Errors
    ///
    /// `ErrorKind::Execution` if the predicate references a column outside
    /// `view`, carries a mistyped bound value, or the backend fails.
    fn select_uids(&self, view: View, predicate: &Predicate) -> Result<BTreeSet<Uid>>;

    /// Enrollee rows matching `predicate` (evaluated over `View::Enrollees`)
    ///
    /// No ordering is guaranteed.
    fn select_enrollees(&self, predicate: &Predicate) -> Result<Vec<Enrollee>>;

    /// Row counts
    fn stats(&self) -> Result<StoreStats>;
}

impl<S: RosterStore + ?Sized> RosterStore for Arc<S> {
    fn select_uids(&self, view: View, predicate: &Predicate) -> Result<BTreeSet<Uid>> {
        (**self).select_uids(view, predicate)
    }

    fn select_enrollees(&self, predicate: &Predicate) -> Result<Vec<Enrollee>> {
        (**self).select_enrollees(predicate)
    }

    fn stats(&self) -> Result<StoreStats> {
        (**self).stats()
    }
}

/// Write-once slot holding the process's store
#[derive(Default)]
pub struct StoreHandle {
    slot: OnceCell<Box<dyn RosterStore>>,
}

impl StoreHandle {
    /// A handle with no store installed yet
    pub const fn empty() -> Self {
        Self {
            slot: OnceCell::new(),
        }
    }

    /// A handle with `store` already installed
    pub fn new(store: impl RosterStore + 'static) -> Self {
        Self {
            slot: OnceCell::with_value(Box::new(store)),
        }
    }

    /// Install the store; fails if one is already installed
    pub fn install(&self, store: impl RosterStore + 'static) -> Result<()> {
        self.slot
            .set(Box::new(store))
            .map_err(|_| StorageError::internal("Store handle is already initialized"))?;
        tracing::debug!("roster store installed");
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.slot.get().is_some()
    }

    /// The installed store, or `ErrorKind::Unavailable`
    pub fn get(&self) -> Result<&dyn RosterStore> {
        self.slot
            .get()
            .map(|store| &**store)
            .ok_or_else(StorageError::unavailable)
    }
}

impl std::fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHandle")
            .field("ready", &self.is_ready())
            .finish()
    }
}
