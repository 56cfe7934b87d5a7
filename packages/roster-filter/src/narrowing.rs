//! Candidate narrowing engine
//!
//! Runs one distinct-uid lookup per record constraint and intersects the
//! results into a shrinking candidate set.
//!
//! # Enumeration mode
//!
//! Once the candidate set is known and smaller than the threshold, every later
//! lookup is scoped with `uid IN (candidates)`, so its cost is bounded by the
//! candidate count rather than by the size of the record table. The switch is
//! one-directional for the rest of the evaluation.
//!
//! # Short-circuit
//!
//! An empty candidate set ends the loop; no further lookups are issued.
//!
//! # Batching
//!
//! A scoped lookup binds at most `batch_size` uids; larger candidate sets are
//! split across several lookups whose matches are unioned.
//!
//! Intersection is commutative, so the final set does not depend on the order
//! of the constraints. Only the number of scoped lookups does.

use std::collections::BTreeSet;

use roster_storage::{Column, Condition, Predicate, RosterStore, Uid, View};
use tracing::debug;

use crate::candidates::CandidateSet;
use crate::compiler::compile;
use crate::config::RecordConstraint;
use crate::error::{FilterError, Result, Stage};
use crate::stats::FilterStats;

pub struct NarrowingEngine<'a> {
    store: &'a dyn RosterStore,
    threshold: usize,
    batch_size: usize,
}

impl<'a> NarrowingEngine<'a> {
    pub fn new(store: &'a dyn RosterStore, threshold: usize, batch_size: usize) -> Self {
        Self {
            store,
            threshold,
            batch_size: batch_size.max(1),
        }
    }

    pub fn narrow(
        &self,
        initial: CandidateSet,
        records: &[RecordConstraint],
        stats: &mut FilterStats,
    ) -> Result<CandidateSet> {
        let mut candidates = initial;
        let mut enumeration_mode = candidates.is_below(self.threshold);
        if enumeration_mode {
            stats.enumeration_engaged_at = Some(0);
        }

        for (index, constraint) in records.iter().enumerate() {
            if candidates.is_empty() {
                debug!(
                    skipped = records.len() - index,
                    "candidate set empty, skipping remaining constraints"
                );
                break;
            }

            let stage = Stage::Narrowing { constraint: index };
            let predicate = compile(constraint);
            let (matched, scoped) = match candidates.uids() {
                Some(uids) if enumeration_mode => {
                    (self.scoped_lookup(&predicate, uids, stage, stats)?, true)
                }
                _ => {
                    let matched = self
                        .store
                        .select_uids(View::RecordContest, &predicate)
                        .map_err(FilterError::at(stage))?;
                    stats.narrowing_lookups += 1;
                    (matched, false)
                }
            };
            stats.constraints_evaluated += 1;

            let matched_count = matched.len();
            candidates = candidates.intersect(matched);

            debug!(
                constraint = index,
                scoped,
                matched = matched_count,
                candidates = candidates.len().unwrap_or_default(),
                "narrowing step"
            );

            if !enumeration_mode && candidates.is_below(self.threshold) {
                enumeration_mode = true;
                stats.enumeration_engaged_at = Some(index + 1);
                debug!(
                    after = index + 1,
                    threshold = self.threshold,
                    "enumeration mode engaged"
                );
            }
        }

        stats.short_circuited = candidates.is_empty();
        Ok(candidates)
    }

    /// Run `predicate` restricted to `uids`, one lookup per batch
    fn scoped_lookup(
        &self,
        predicate: &Predicate,
        uids: &BTreeSet<Uid>,
        stage: Stage,
        stats: &mut FilterStats,
    ) -> Result<BTreeSet<Uid>> {
        let uids: Vec<&str> = uids.iter().map(String::as_str).collect();
        let mut matched = BTreeSet::new();
        for batch in uids.chunks(self.batch_size) {
            let scoped = predicate
                .clone()
                .and(Condition::one_of(Column::Uid, batch.iter().copied()));
            matched.extend(
                self.store
                    .select_uids(View::RecordContest, &scoped)
                    .map_err(FilterError::at(stage))?,
            );
            stats.narrowing_lookups += 1;
            stats.scoped_lookups += 1;
        }
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RangeBound, SetFilter};
    use roster_storage::{Contest, ContestRecord, Dataset, Enrollee, MemoryRosterStore};

    /// 30 enrollees; u00..u29. Every one sat contest 1 (2023); only u00..u04
    /// sat contest 2 (2024); only u00 and u01 placed gold anywhere.
    fn store() -> MemoryRosterStore {
        let mut dataset = Dataset {
            contests: vec![Contest::new(1, 2023, "NOIP"), Contest::new(2, 2024, "NOI")],
            ..Dataset::default()
        };
        for i in 0..30_i32 {
            let uid = format!("u{:02}", i);
            dataset
                .enrollees
                .push(Enrollee::new(uid.clone(), uid.clone(), 2020, f64::from(i)));
            let level = if i < 2 { "gold" } else { "bronze" };
            dataset
                .records
                .push(ContestRecord::new(uid.clone(), 1, 100.0, i64::from(i) + 1, "ZJ", level));
            if i < 5 {
                dataset
                    .records
                    .push(ContestRecord::new(uid, 2, 90.0, i64::from(i) + 1, "ZJ", "silver"));
            }
        }
        MemoryRosterStore::from_dataset(&dataset)
    }

    fn noi() -> RecordConstraint {
        RecordConstraint::new().contest_types(SetFilter::of(["NOI"]))
    }

    fn gold() -> RecordConstraint {
        RecordConstraint::new().levels(SetFilter::of(["gold"]))
    }

    fn any_2023() -> RecordConstraint {
        RecordConstraint::new().years(RangeBound::between(2023, 2023))
    }

    #[test]
    fn test_first_constraint_adopts_matches() {
        let store = store();
        let mut stats = FilterStats::default();
        let result = NarrowingEngine::new(&store, 20, 500)
            .narrow(CandidateSet::Unconstrained, &[any_2023()], &mut stats)
            .unwrap();

        assert_eq!(result.len(), Some(30));
        assert_eq!(stats.narrowing_lookups, 1);
        assert_eq!(stats.scoped_lookups, 0);
        assert_eq!(stats.enumeration_engaged_at, None);
    }

    #[test]
    fn test_enumeration_engages_and_scopes_later_lookups() {
        let store = store();
        let mut stats = FilterStats::default();
        let result = NarrowingEngine::new(&store, 20, 500)
            .narrow(
                CandidateSet::Unconstrained,
                &[any_2023(), noi(), gold()],
                &mut stats,
            )
            .unwrap();

        assert_eq!(
            result.uids().unwrap().iter().collect::<Vec<_>>(),
            vec!["u00", "u01"]
        );
        assert_eq!(stats.narrowing_lookups, 3);
        // After `noi` the set has 5 members: the gold lookup is scoped.
        assert_eq!(stats.enumeration_engaged_at, Some(2));
        assert_eq!(stats.scoped_lookups, 1);
    }

    #[test]
    fn test_small_initial_set_scopes_from_start() {
        let store = store();
        let initial: CandidateSet = ["u00".to_string(), "u07".to_string()].into_iter().collect();
        let mut stats = FilterStats::default();
        let result = NarrowingEngine::new(&store, 20, 500)
            .narrow(initial, &[any_2023(), gold()], &mut stats)
            .unwrap();

        assert_eq!(result.len(), Some(1));
        assert_eq!(stats.enumeration_engaged_at, Some(0));
        assert_eq!(stats.scoped_lookups, 2);
    }

    #[test]
    fn test_empty_set_short_circuits() {
        let store = store();
        let mut stats = FilterStats::default();
        let disjoint = RecordConstraint::new().years(RangeBound::at_least(2030));
        let result = NarrowingEngine::new(&store, 20, 500)
            .narrow(
                CandidateSet::Unconstrained,
                &[disjoint, noi(), gold()],
                &mut stats,
            )
            .unwrap();

        assert!(result.is_empty());
        assert_eq!(stats.narrowing_lookups, 1);
        assert!(stats.short_circuited);
    }

    #[test]
    fn test_empty_initial_set_issues_no_lookup() {
        let store = store();
        let mut stats = FilterStats::default();
        let result = NarrowingEngine::new(&store, 20, 500)
            .narrow(CandidateSet::Known(Default::default()), &[noi()], &mut stats)
            .unwrap();

        assert!(result.is_empty());
        assert_eq!(stats.narrowing_lookups, 0);
        assert!(stats.short_circuited);
    }

    #[test]
    fn test_last_constraint_emptying_set_is_flagged() {
        let store = store();
        let mut stats = FilterStats::default();
        let disjoint = RecordConstraint::new().years(RangeBound::at_least(2030));
        let result = NarrowingEngine::new(&store, 20, 500)
            .narrow(CandidateSet::Unconstrained, &[noi(), disjoint], &mut stats)
            .unwrap();

        assert!(result.is_empty());
        assert_eq!(stats.constraints_evaluated, 2);
        assert!(stats.short_circuited);
    }

    #[test]
    fn test_non_empty_result_is_not_flagged() {
        let store = store();
        let mut stats = FilterStats::default();
        NarrowingEngine::new(&store, 20, 500)
            .narrow(CandidateSet::Unconstrained, &[noi(), gold()], &mut stats)
            .unwrap();
        assert!(!stats.short_circuited);
    }

    #[test]
    fn test_scoped_lookup_is_split_into_batches() {
        let store = store();
        let initial: CandidateSet = (0..7).map(|i| format!("u{:02}", i)).collect();

        let mut single = FilterStats::default();
        let whole = NarrowingEngine::new(&store, 20, 500)
            .narrow(initial.clone(), &[noi(), gold()], &mut single)
            .unwrap();

        let mut batched = FilterStats::default();
        let split = NarrowingEngine::new(&store, 20, 2)
            .narrow(initial, &[noi(), gold()], &mut batched)
            .unwrap();

        assert_eq!(whole, split);
        assert_eq!(split.len(), Some(2));
        assert_eq!(single.narrowing_lookups, 2);
        // 7 candidates in batches of 2, then the 5 NOI entrants in batches of 2.
        assert_eq!(batched.narrowing_lookups, 4 + 3);
        assert_eq!(batched.scoped_lookups, 7);
        assert_eq!(batched.constraints_evaluated, 2);
    }

    #[test]
    fn test_store_error_carries_constraint_index() {
        struct Failing;
        impl RosterStore for Failing {
            fn select_uids(
                &self,
                _view: View,
                _predicate: &roster_storage::Predicate,
            ) -> roster_storage::Result<std::collections::BTreeSet<roster_storage::Uid>> {
                Err(roster_storage::StorageError::execution("boom"))
            }
            fn select_enrollees(
                &self,
                _predicate: &roster_storage::Predicate,
            ) -> roster_storage::Result<Vec<Enrollee>> {
                Ok(Vec::new())
            }
            fn stats(&self) -> roster_storage::Result<roster_storage::StoreStats> {
                Ok(Default::default())
            }
        }

        let mut stats = FilterStats::default();
        let err = NarrowingEngine::new(&Failing, 20, 500)
            .narrow(CandidateSet::Unconstrained, &[noi()], &mut stats)
            .unwrap_err();
        assert!(err.is_execution());
        assert_eq!(err.stage, Stage::Narrowing { constraint: 0 });
    }
}
