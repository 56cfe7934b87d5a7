//! In-Memory Roster Store
//!
//! Vec-backed implementation that evaluates predicates row-by-row.
//! The record/contest join is materialized once at construction.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::domain::models::{Contest, ContestId, Dataset, Enrollee, Uid};
use crate::domain::ports::{RosterStore, StoreStats};
use crate::domain::predicate::{CellRef, Column, Predicate, RowSource, View};
use crate::Result;

/// One row of the record ⋈ contest view
#[derive(Debug, Clone, PartialEq)]
struct JoinedRecord {
    uid: Uid,
    contest_year: i64,
    contest_type: String,
    score: f64,
    rank: i64,
    province: String,
    level: String,
}

impl RowSource for JoinedRecord {
    fn cell(&self, column: Column) -> Option<CellRef<'_>> {
        match column {
            Column::Uid => Some(CellRef::Text(&self.uid)),
            Column::ContestYear => Some(CellRef::Int(self.contest_year)),
            Column::ContestType => Some(CellRef::Text(&self.contest_type)),
            Column::Score => Some(CellRef::Real(self.score)),
            Column::Rank => Some(CellRef::Int(self.rank)),
            Column::Province => Some(CellRef::Text(&self.province)),
            Column::Level => Some(CellRef::Text(&self.level)),
            Column::EnrollmentYear => None,
        }
    }
}

impl RowSource for Enrollee {
    fn cell(&self, column: Column) -> Option<CellRef<'_>> {
        match column {
            Column::Uid => Some(CellRef::Text(&self.uid)),
            Column::EnrollmentYear => Some(CellRef::Int(i64::from(self.enrollment_year))),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryRosterStore {
    enrollees: Vec<Enrollee>,
    joined: Vec<JoinedRecord>,
    contest_count: usize,
}

impl MemoryRosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the store from a dataset; records whose contest is unknown are
    /// dropped by the join, as they would be in SQL.
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let contests: HashMap<ContestId, &Contest> =
            dataset.contests.iter().map(|c| (c.id, c)).collect();

        let joined = dataset
            .records
            .iter()
            .filter_map(|r| {
                contests.get(&r.contest_id).map(|c| JoinedRecord {
                    uid: r.uid.clone(),
                    contest_year: i64::from(c.year),
                    contest_type: c.contest_type.clone(),
                    score: r.score,
                    rank: r.rank,
                    province: r.province.clone(),
                    level: r.level.clone(),
                })
            })
            .collect();

        Self {
            enrollees: dataset.enrollees.clone(),
            joined,
            contest_count: dataset.contests.len(),
        }
    }
}

impl RosterStore for MemoryRosterStore {
    fn select_uids(&self, view: View, predicate: &Predicate) -> Result<BTreeSet<Uid>> {
        predicate.check(view)?;
        debug!(%view, bound = predicate.bound_value_count(), "select_uids (memory)");
        let uids = match view {
            View::Enrollees => self
                .enrollees
                .iter()
                .filter(|e| predicate.matches(*e))
                .map(|e| e.uid.clone())
                .collect(),
            View::RecordContest => self
                .joined
                .iter()
                .filter(|r| predicate.matches(*r))
                .map(|r| r.uid.clone())
                .collect(),
        };
        Ok(uids)
    }

    fn select_enrollees(&self, predicate: &Predicate) -> Result<Vec<Enrollee>> {
        predicate.check(View::Enrollees)?;
        debug!(bound = predicate.bound_value_count(), "select_enrollees (memory)");
        Ok(self
            .enrollees
            .iter()
            .filter(|e| predicate.matches(*e))
            .cloned()
            .collect())
    }

    fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            enrollees: self.enrollees.len(),
            contests: self.contest_count,
            records: self.joined.len(),
        })
    }
}
