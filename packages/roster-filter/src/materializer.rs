//! Result materializer
//!
//! Fetches the enrollee rows for the final candidate set and orders them by
//! aggregate score, highest first. Equal scores are ordered by uid ascending,
//! so the output never depends on the store's row order.

use std::cmp::Ordering;

use roster_storage::{Column, Condition, Enrollee, Predicate, RosterStore};
use tracing::debug;

use crate::candidates::CandidateSet;
use crate::error::{FilterError, Result, Stage};
use crate::stats::FilterStats;

/// Score-descending, uid-ascending order
pub fn by_score_desc(a: &Enrollee, b: &Enrollee) -> Ordering {
    b.aggregate_score
        .total_cmp(&a.aggregate_score)
        .then_with(|| a.uid.cmp(&b.uid))
}

pub struct ResultMaterializer<'a> {
    store: &'a dyn RosterStore,
    batch_size: usize,
}

impl<'a> ResultMaterializer<'a> {
    pub fn new(store: &'a dyn RosterStore, batch_size: usize) -> Self {
        Self {
            store,
            batch_size: batch_size.max(1),
        }
    }

    /// Materialize the result
    ///
    /// - nothing requested: every enrollee
    /// - unconstrained or empty candidates: nothing, without a lookup
    /// - otherwise: the candidates' rows, fetched in uid batches
    pub fn materialize(
        &self,
        filtering_requested: bool,
        candidates: &CandidateSet,
        stats: &mut FilterStats,
    ) -> Result<Vec<Enrollee>> {
        let mut rows = if !filtering_requested {
            stats.materialize_lookups += 1;
            self.store
                .select_enrollees(&Predicate::always())
                .map_err(FilterError::at(Stage::Materialize))?
        } else {
            match candidates.uids() {
                Some(uids) if !uids.is_empty() => {
                    let uids: Vec<&str> = uids.iter().map(String::as_str).collect();
                    let mut rows = Vec::with_capacity(uids.len());
                    for batch in uids.chunks(self.batch_size) {
                        let predicate = Predicate::always()
                            .and(Condition::one_of(Column::Uid, batch.iter().copied()));
                        stats.materialize_lookups += 1;
                        rows.extend(
                            self.store
                                .select_enrollees(&predicate)
                                .map_err(FilterError::at(Stage::Materialize))?,
                        );
                    }
                    rows
                }
                _ => {
                    debug!("no candidates, skipping materialization");
                    return Ok(Vec::new());
                }
            }
        };

        rows.sort_by(by_score_desc);
        debug!(rows = rows.len(), "materialized");
        Ok(rows)
    }
}
