//! Store wrapper that records every lookup it serves

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use roster_storage::{
    Column, Enrollee, Predicate, Result, RosterStore, StoreStats, Uid, View,
};

/// One lookup as seen by the store
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Uids { view: View, predicate: Predicate },
    Enrollees { predicate: Predicate },
}

impl Lookup {
    pub fn view(&self) -> View {
        match self {
            Lookup::Uids { view, .. } => *view,
            Lookup::Enrollees { .. } => View::Enrollees,
        }
    }

    pub fn predicate(&self) -> &Predicate {
        match self {
            Lookup::Uids { predicate, .. } | Lookup::Enrollees { predicate } => predicate,
        }
    }

    /// Whether the lookup was restricted to an explicit uid list
    pub fn is_scoped(&self) -> bool {
        self.predicate()
            .conditions()
            .iter()
            .any(|c| c.column() == Column::Uid)
    }
}

/// Shared view of the lookups a [`RecordingStore`] has served
#[derive(Debug, Clone, Default)]
pub struct LookupLog(Arc<Mutex<Vec<Lookup>>>);

impl LookupLog {
    fn push(&self, lookup: Lookup) {
        self.0.lock().unwrap().push(lookup);
    }

    pub fn all(&self) -> Vec<Lookup> {
        self.0.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn against(&self, view: View) -> Vec<Lookup> {
        self.all().into_iter().filter(|l| l.view() == view).collect()
    }

    pub fn materializations(&self) -> usize {
        self.all()
            .iter()
            .filter(|l| matches!(l, Lookup::Enrollees { .. }))
            .count()
    }
}

pub struct RecordingStore<S> {
    inner: S,
    log: LookupLog,
}

impl<S: RosterStore> RecordingStore<S> {
    pub fn new(inner: S) -> (Self, LookupLog) {
        let log = LookupLog::default();
        (
            Self {
                inner,
                log: log.clone(),
            },
            log,
        )
    }
}

impl<S: RosterStore> RosterStore for RecordingStore<S> {
    fn select_uids(&self, view: View, predicate: &Predicate) -> Result<BTreeSet<Uid>> {
        self.log.push(Lookup::Uids {
            view,
            predicate: predicate.clone(),
        });
        self.inner.select_uids(view, predicate)
    }

    fn select_enrollees(&self, predicate: &Predicate) -> Result<Vec<Enrollee>> {
        self.log.push(Lookup::Enrollees {
            predicate: predicate.clone(),
        });
        self.inner.select_enrollees(predicate)
    }

    fn stats(&self) -> Result<StoreStats> {
        self.inner.stats()
    }
}
