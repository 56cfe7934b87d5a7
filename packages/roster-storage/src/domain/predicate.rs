//! Typed predicate IR
//!
//! A [`Predicate`] is a conjunction of [`Condition`]s over the columns of one
//! [`View`]. Every condition carries its own bound values, so a predicate can be
//! rendered to parameterized SQL or evaluated row-by-row without re-deriving
//! anything from the query that produced it.
//!
//! ```text
//! Predicate = C₁ ∧ C₂ ∧ ... ∧ Cₙ          (n = 0 ⇒ tautology)
//! Cᵢ        = column ≥ v | column ≤ v | column ∈ {v₁, ..., vₖ}
//! ```

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Result, StorageError};

/// Logical view a lookup runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// The enrollee table
    Enrollees,
    /// Contest records joined with their contest
    RecordContest,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Enrollees => "enrollees",
            View::RecordContest => "record_contest",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Real,
    Text,
}

/// Filterable column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    /// Enrollee identifier (present in both views)
    Uid,
    EnrollmentYear,
    ContestYear,
    Rank,
    Score,
    Province,
    ContestType,
    Level,
}

impl Column {
    /// Column name as exposed by both storage views
    pub fn name(&self) -> &'static str {
        match self {
            Column::Uid => "uid",
            Column::EnrollmentYear => "enrollment_year",
            Column::ContestYear => "contest_year",
            Column::Rank => "rank",
            Column::Score => "score",
            Column::Province => "province",
            Column::ContestType => "contest_type",
            Column::Level => "level",
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Column::EnrollmentYear | Column::ContestYear | Column::Rank => ValueKind::Integer,
            Column::Score => ValueKind::Real,
            Column::Uid | Column::Province | Column::ContestType | Column::Level => {
                ValueKind::Text
            }
        }
    }

    pub fn in_view(&self, view: View) -> bool {
        match view {
            View::Enrollees => matches!(self, Column::Uid | Column::EnrollmentYear),
            View::RecordContest => !matches!(self, Column::EnrollmentYear),
        }
    }
}

/// A value bound into a condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoundValue {
    Int(i64),
    Real(f64),
    Text(String),
}

impl BoundValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            BoundValue::Int(_) => ValueKind::Integer,
            BoundValue::Real(_) => ValueKind::Real,
            BoundValue::Text(_) => ValueKind::Text,
        }
    }

    /// Whether this value may be compared against a column of `kind`
    ///
    /// Integers and reals are mutually comparable; text only against text.
    pub fn fits(&self, kind: ValueKind) -> bool {
        match (self, kind) {
            (BoundValue::Text(_), ValueKind::Text) => true,
            (BoundValue::Text(_), _) | (_, ValueKind::Text) => false,
            (BoundValue::Real(v), _) => !v.is_nan(),
            (BoundValue::Int(_), _) => true,
        }
    }

    /// Compare a stored cell against this value (`cell.cmp(self)`)
    pub fn compare_cell(&self, cell: CellRef<'_>) -> Option<Ordering> {
        match (cell, self) {
            (CellRef::Int(c), BoundValue::Int(v)) => Some(c.cmp(v)),
            (CellRef::Int(c), BoundValue::Real(v)) => (c as f64).partial_cmp(v),
            (CellRef::Real(c), BoundValue::Int(v)) => c.partial_cmp(&(*v as f64)),
            (CellRef::Real(c), BoundValue::Real(v)) => c.partial_cmp(v),
            (CellRef::Text(c), BoundValue::Text(v)) => Some(c.cmp(&v.as_str())),
            _ => None,
        }
    }
}

impl From<i32> for BoundValue {
    fn from(v: i32) -> Self {
        BoundValue::Int(i64::from(v))
    }
}

impl From<i64> for BoundValue {
    fn from(v: i64) -> Self {
        BoundValue::Int(v)
    }
}

impl From<f64> for BoundValue {
    fn from(v: f64) -> Self {
        BoundValue::Real(v)
    }
}

impl From<&str> for BoundValue {
    fn from(v: &str) -> Self {
        BoundValue::Text(v.to_string())
    }
}

impl From<String> for BoundValue {
    fn from(v: String) -> Self {
        BoundValue::Text(v)
    }
}

/// Borrowed view of one stored cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellRef<'a> {
    Int(i64),
    Real(f64),
    Text(&'a str),
}

/// Anything a predicate can be evaluated against row-by-row
pub trait RowSource {
    fn cell(&self, column: Column) -> Option<CellRef<'_>>;
}

/// One conjunct
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Inclusive lower bound: `column >= value`
    AtLeast { column: Column, value: BoundValue },
    /// Inclusive upper bound: `column <= value`
    AtMost { column: Column, value: BoundValue },
    /// Membership: `column IN (values)`
    OneOf {
        column: Column,
        values: Vec<BoundValue>,
    },
}

impl Condition {
    pub fn at_least(column: Column, value: impl Into<BoundValue>) -> Self {
        Condition::AtLeast {
            column,
            value: value.into(),
        }
    }

    pub fn at_most(column: Column, value: impl Into<BoundValue>) -> Self {
        Condition::AtMost {
            column,
            value: value.into(),
        }
    }

    pub fn one_of<I, V>(column: Column, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<BoundValue>,
    {
        Condition::OneOf {
            column,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn column(&self) -> Column {
        match self {
            Condition::AtLeast { column, .. }
            | Condition::AtMost { column, .. }
            | Condition::OneOf { column, .. } => *column,
        }
    }

    /// Bound values in placeholder order
    pub fn bound_values(&self) -> &[BoundValue] {
        match self {
            Condition::AtLeast { value, .. } | Condition::AtMost { value, .. } => {
                std::slice::from_ref(value)
            }
            Condition::OneOf { values, .. } => values,
        }
    }

    pub fn evaluate<R: RowSource + ?Sized>(&self, row: &R) -> bool {
        let Some(cell) = row.cell(self.column()) else {
            return false;
        };
        match self {
            Condition::AtLeast { value, .. } => {
                matches!(value.compare_cell(cell), Some(Ordering::Greater | Ordering::Equal))
            }
            Condition::AtMost { value, .. } => {
                matches!(value.compare_cell(cell), Some(Ordering::Less | Ordering::Equal))
            }
            Condition::OneOf { values, .. } => values
                .iter()
                .any(|v| v.compare_cell(cell) == Some(Ordering::Equal)),
        }
    }
}

/// Conjunction of conditions; empty means "matches every row"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

impl Predicate {
    /// The tautology
    pub fn always() -> Self {
        Self::default()
    }

    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    pub fn is_tautology(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// All bound values, flattened in placeholder order
    pub fn bound_values(&self) -> impl Iterator<Item = &BoundValue> {
        self.conditions.iter().flat_map(|c| c.bound_values())
    }

    pub fn bound_value_count(&self) -> usize {
        self.conditions.iter().map(|c| c.bound_values().len()).sum()
    }

    /// Reject columns foreign to `view` and values of the wrong type
    pub fn check(&self, view: View) -> Result<()> {
        for condition in &self.conditions {
            let column = condition.column();
            if !column.in_view(view) {
                return Err(StorageError::execution(format!(
                    "column '{}' is not part of view '{}'",
                    column.name(),
                    view
                )));
            }
            if let Some(bad) = condition
                .bound_values()
                .iter()
                .find(|v| !v.fits(column.kind()))
            {
                return Err(StorageError::execution(format!(
                    "bound value {:?} does not match type {:?} of column '{}'",
                    bad,
                    column.kind(),
                    column.name()
                )));
            }
        }
        Ok(())
    }

    pub fn matches<R: RowSource + ?Sized>(&self, row: &R) -> bool {
        self.conditions.iter().all(|c| c.evaluate(row))
    }
}
