//! Canonical query configuration
//!
//! Every constraint field has one documented default: **absent or empty means
//! unconstrained**. The rule is enforced in exactly two places,
//! [`RangeBound::is_unbounded`] and [`SetFilter::is_constraining`]; nothing
//! else in the crate inspects field emptiness.
//!
//! # Wire shape
//!
//! ```json
//! {
//!   "enrollment_year_range": [2020, null],
//!   "grade_range": [1, 3],
//!   "records": [
//!     { "year_range": [2022, 2024], "rank_range": [null, 50],
//!       "contest_type": ["NOIP"], "level_range": ["gold", "silver"] }
//!   ]
//! }
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Independently-sided inclusive bound pair
///
/// Serialized as `[min, max]` (either side may be `null`); an unbounded pair
/// serializes as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "Option<(Option<T>, Option<T>)>",
    into = "Option<(Option<T>, Option<T>)>",
    bound(serialize = "T: Serialize + Clone", deserialize = "T: Deserialize<'de>")
)]
pub struct RangeBound<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T> RangeBound<T> {
    pub const fn unbounded() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    pub const fn new(min: Option<T>, max: Option<T>) -> Self {
        Self { min, max }
    }

    pub const fn between(min: T, max: T) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub const fn at_least(min: T) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub const fn at_most(max: T) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    /// True when neither side restricts anything
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

impl<T: Copy + PartialOrd> RangeBound<T> {
    /// The tightest pair satisfying both `self` and `other`
    pub fn intersect(&self, other: &Self) -> Self {
        fn pick<T: Copy + PartialOrd>(a: Option<T>, b: Option<T>, keep_larger: bool) -> Option<T> {
            match (a, b) {
                (Some(a), Some(b)) => Some(if (a >= b) == keep_larger { a } else { b }),
                (a, None) => a,
                (None, b) => b,
            }
        }
        Self {
            min: pick(self.min, other.min, true),
            max: pick(self.max, other.max, false),
        }
    }
}

impl<T> Default for RangeBound<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<T> From<Option<(Option<T>, Option<T>)>> for RangeBound<T> {
    fn from(pair: Option<(Option<T>, Option<T>)>) -> Self {
        match pair {
            Some((min, max)) => Self { min, max },
            None => Self::unbounded(),
        }
    }
}

impl<T> From<RangeBound<T>> for Option<(Option<T>, Option<T>)> {
    fn from(bound: RangeBound<T>) -> Self {
        if bound.is_unbounded() {
            None
        } else {
            Some((bound.min, bound.max))
        }
    }
}

/// Membership filter with an explicit tri-state
///
/// `Absent` and `Empty` are both unconstrained; they are kept apart only so a
/// caller's input can be echoed back faithfully before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<Vec<String>>", into = "Option<Vec<String>>")]
pub enum SetFilter {
    /// Field not given
    #[default]
    Absent,
    /// Field given as an empty list
    Empty,
    /// Allowed values
    Values(BTreeSet<String>),
}

impl SetFilter {
    pub fn of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            SetFilter::Empty
        } else {
            SetFilter::Values(values)
        }
    }

    /// Only a populated set restricts anything
    pub fn is_constraining(&self) -> bool {
        matches!(self, SetFilter::Values(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, SetFilter::Absent)
    }

    pub fn values(&self) -> Option<&BTreeSet<String>> {
        match self {
            SetFilter::Values(values) => Some(values),
            SetFilter::Absent | SetFilter::Empty => None,
        }
    }

    /// Collapse `Empty` into `Absent`
    pub fn canonical(&self) -> Self {
        match self {
            SetFilter::Values(values) => SetFilter::Values(values.clone()),
            SetFilter::Absent | SetFilter::Empty => SetFilter::Absent,
        }
    }
}

impl From<Option<Vec<String>>> for SetFilter {
    fn from(values: Option<Vec<String>>) -> Self {
        match values {
            None => SetFilter::Absent,
            Some(values) => SetFilter::of(values),
        }
    }
}

impl From<SetFilter> for Option<Vec<String>> {
    fn from(filter: SetFilter) -> Self {
        match filter {
            SetFilter::Absent => None,
            SetFilter::Empty => Some(Vec::new()),
            SetFilter::Values(values) => Some(values.into_iter().collect()),
        }
    }
}

/// Constraints over one contest record (joined with its contest)
///
/// A record constraint matches an enrollee when at least one of the enrollee's
/// records satisfies every field at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecordConstraint {
    /// Bounds on the contest year
    #[serde(skip_serializing_if = "RangeBound::is_unbounded")]
    pub year_range: RangeBound<i32>,
    #[serde(skip_serializing_if = "RangeBound::is_unbounded")]
    pub rank_range: RangeBound<i64>,
    #[serde(skip_serializing_if = "RangeBound::is_unbounded")]
    pub score_range: RangeBound<f64>,
    #[serde(skip_serializing_if = "SetFilter::is_absent")]
    pub province: SetFilter,
    #[serde(skip_serializing_if = "SetFilter::is_absent")]
    pub contest_type: SetFilter,
    /// Allowed award levels (a membership filter despite the name)
    #[serde(skip_serializing_if = "SetFilter::is_absent")]
    pub level_range: SetFilter,
}

impl RecordConstraint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn years(mut self, bound: RangeBound<i32>) -> Self {
        self.year_range = bound;
        self
    }

    pub fn ranks(mut self, bound: RangeBound<i64>) -> Self {
        self.rank_range = bound;
        self
    }

    pub fn scores(mut self, bound: RangeBound<f64>) -> Self {
        self.score_range = bound;
        self
    }

    pub fn provinces(mut self, filter: SetFilter) -> Self {
        self.province = filter;
        self
    }

    pub fn contest_types(mut self, filter: SetFilter) -> Self {
        self.contest_type = filter;
        self
    }

    pub fn levels(mut self, filter: SetFilter) -> Self {
        self.level_range = filter;
        self
    }

    /// Same constraint with every empty set filter collapsed to absent
    pub fn canonical(&self) -> Self {
        Self {
            year_range: self.year_range,
            rank_range: self.rank_range,
            score_range: self.score_range,
            province: self.province.canonical(),
            contest_type: self.contest_type.canonical(),
            level_range: self.level_range.canonical(),
        }
    }
}

/// The canonical query handed to the engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryConfig {
    #[serde(skip_serializing_if = "RangeBound::is_unbounded")]
    pub enrollment_year_range: RangeBound<i32>,
    /// School grade window, translated against the current calendar year
    #[serde(skip_serializing_if = "RangeBound::is_unbounded")]
    pub grade_range: RangeBound<i32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<RecordConstraint>,
}

impl QueryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enrollment_years(mut self, bound: RangeBound<i32>) -> Self {
        self.enrollment_year_range = bound;
        self
    }

    pub fn grades(mut self, bound: RangeBound<i32>) -> Self {
        self.grade_range = bound;
        self
    }

    pub fn record(mut self, constraint: RecordConstraint) -> Self {
        self.records.push(constraint);
        self
    }

    /// Whether either enrollee-level bound pair has a present side
    pub fn has_base_constraints(&self) -> bool {
        !self.enrollment_year_range.is_unbounded() || !self.grade_range.is_unbounded()
    }

    /// Whether any filtering at all was requested
    pub fn has_constraints(&self) -> bool {
        self.has_base_constraints() || !self.records.is_empty()
    }

    /// The configuration actually evaluated
    ///
    /// The grade window is folded into the enrollment-year range (see
    /// [`grade_to_enrollment`]) and cleared; empty set filters become absent.
    pub fn normalize(&self, current_year: i32, grade_offset: i32) -> Self {
        let from_grades = grade_to_enrollment(&self.grade_range, current_year, grade_offset);
        Self {
            enrollment_year_range: self.enrollment_year_range.intersect(&from_grades),
            grade_range: RangeBound::unbounded(),
            records: self.records.iter().map(RecordConstraint::canonical).collect(),
        }
    }
}

/// Translate a grade window into an enrollment-year window
///
/// ```text
/// min_enrollment = Y - max_grade + offset
/// max_enrollment = Y - min_grade + offset
/// ```
///
/// Each side is present only if the opposite grade bound is present.
/// Out-of-range grades saturate at the `i32` limits rather than overflow.
pub fn grade_to_enrollment(grades: &RangeBound<i32>, current_year: i32, offset: i32) -> RangeBound<i32> {
    let year_of = |grade: i32| current_year.saturating_sub(grade).saturating_add(offset);
    RangeBound {
        min: grades.max.map(year_of),
        max: grades.min.map(year_of),
    }
}
