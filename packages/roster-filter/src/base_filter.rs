//! Base-entity filter
//!
//! Evaluates the enrollment-year and grade windows directly against the
//! enrollee view. Both windows apply at once; each present side becomes one
//! inclusive condition on `enrollment_year`.

use roster_storage::{Column, Condition, Predicate, RosterStore, View};
use tracing::debug;

use crate::candidates::CandidateSet;
use crate::config::{grade_to_enrollment, QueryConfig, RangeBound};
use crate::error::{FilterError, Result, Stage};

/// Conditions on `enrollment_year` for the query's base windows
///
/// Returns `None` when neither window has a present side.
pub fn base_predicate(config: &QueryConfig, current_year: i32, grade_offset: i32) -> Option<Predicate> {
    if !config.has_base_constraints() {
        return None;
    }

    let from_grades = grade_to_enrollment(&config.grade_range, current_year, grade_offset);
    let mut predicate = Predicate::always();
    for window in [&config.enrollment_year_range, &from_grades] {
        push_year_bounds(&mut predicate, window);
    }
    Some(predicate)
}

fn push_year_bounds(predicate: &mut Predicate, window: &RangeBound<i32>) {
    if let Some(min) = window.min {
        predicate.push(Condition::at_least(Column::EnrollmentYear, min));
    }
    if let Some(max) = window.max {
        predicate.push(Condition::at_most(Column::EnrollmentYear, max));
    }
}

pub struct BaseEntityFilter<'a> {
    store: &'a dyn RosterStore,
    current_year: i32,
    grade_offset: i32,
}

impl<'a> BaseEntityFilter<'a> {
    pub fn new(store: &'a dyn RosterStore, current_year: i32, grade_offset: i32) -> Self {
        Self {
            store,
            current_year,
            grade_offset,
        }
    }

    /// Initial candidate set: `Unconstrained` without a lookup, or the uids
    /// of enrollees inside every window (one lookup).
    pub fn run(&self, config: &QueryConfig) -> Result<CandidateSet> {
        let Some(predicate) = base_predicate(config, self.current_year, self.grade_offset) else {
            debug!("base filter: unconstrained");
            return Ok(CandidateSet::Unconstrained);
        };

        let uids = self
            .store
            .select_uids(View::Enrollees, &predicate)
            .map_err(FilterError::at(Stage::BaseFilter))?;
        debug!(
            conditions = predicate.conditions().len(),
            matched = uids.len(),
            "base filter"
        );
        Ok(CandidateSet::Known(uids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_storage::{Dataset, Enrollee, MemoryRosterStore};

    fn store() -> MemoryRosterStore {
        MemoryRosterStore::from_dataset(&Dataset {
            enrollees: vec![
                Enrollee::new("e2019", "A", 2019, 50.0),
                Enrollee::new("e2020", "B", 2020, 60.0),
                Enrollee::new("e2028", "C", 2028, 70.0),
                Enrollee::new("e2030", "D", 2030, 80.0),
                Enrollee::new("e2031", "E", 2031, 90.0),
            ],
            ..Dataset::default()
        })
    }

    fn known(c: CandidateSet) -> Vec<String> {
        c.uids().unwrap().iter().cloned().collect()
    }

    #[test]
    fn test_no_windows_is_unconstrained() {
        assert!(base_predicate(&QueryConfig::new(), 2024, 7).is_none());

        let config = QueryConfig::new().enrollment_years(RangeBound::unbounded());
        let store = store();
        let result = BaseEntityFilter::new(&store, 2024, 7).run(&config).unwrap();
        assert!(result.is_unconstrained());
    }

    #[test]
    fn test_one_sided_enrollment_window() {
        let config = QueryConfig::new().enrollment_years(RangeBound::at_least(2030));
        let predicate = base_predicate(&config, 2024, 7).unwrap();
        assert_eq!(predicate.conditions().len(), 1);

        let store = store();
        let result = BaseEntityFilter::new(&store, 2024, 7).run(&config).unwrap();
        assert_eq!(known(result), vec!["e2030", "e2031"]);
    }

    #[test]
    fn test_grade_window_translates() {
        // Grades 1..=3 in 2024 ⇒ enrollment 2028..=2030
        let config = QueryConfig::new().grades(RangeBound::between(1, 3));
        let store = store();
        let result = BaseEntityFilter::new(&store, 2024, 7).run(&config).unwrap();
        assert_eq!(known(result), vec!["e2028", "e2030"]);
    }

    #[test]
    fn test_both_windows_are_anded() {
        let config = QueryConfig::new()
            .enrollment_years(RangeBound::at_most(2029))
            .grades(RangeBound::between(1, 3));
        let predicate = base_predicate(&config, 2024, 7).unwrap();
        assert_eq!(predicate.conditions().len(), 3);

        let store = store();
        let result = BaseEntityFilter::new(&store, 2024, 7).run(&config).unwrap();
        assert_eq!(known(result), vec!["e2028"]);
    }

    #[test]
    fn test_empty_window_is_known_empty() {
        let config = QueryConfig::new().enrollment_years(RangeBound::between(2000, 2001));
        let store = store();
        let result = BaseEntityFilter::new(&store, 2024, 7).run(&config).unwrap();
        assert!(result.is_empty());
    }
}
