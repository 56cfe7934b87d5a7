//! Record predicate compiler
//!
//! Turns one [`RecordConstraint`] into a [`Predicate`] over the record/contest
//! view. Pure and stateless.
//!
//! The field → column mapping is the fixed table [`RecordField::ALL`]:
//!
//! | field          | column         | kind  |
//! |----------------|----------------|-------|
//! | `year_range`   | `contest_year` | range |
//! | `rank_range`   | `rank`         | range |
//! | `score_range`  | `score`        | range |
//! | `province`     | `province`     | set   |
//! | `contest_type` | `contest_type` | set   |
//! | `level_range`  | `level`        | set   |

use roster_storage::{BoundValue, Column, Condition, Predicate};

use crate::config::{RangeBound, RecordConstraint, SetFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Up to two inclusive inequality conditions
    Range,
    /// One membership condition when populated
    Set,
}

/// Constrainable fields of a record constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Year,
    Rank,
    Score,
    Province,
    ContestType,
    Level,
}

impl RecordField {
    /// Every field, in compilation order
    pub const ALL: [RecordField; 6] = [
        RecordField::Year,
        RecordField::Rank,
        RecordField::Score,
        RecordField::Province,
        RecordField::ContestType,
        RecordField::Level,
    ];

    pub fn column(self) -> Column {
        match self {
            RecordField::Year => Column::ContestYear,
            RecordField::Rank => Column::Rank,
            RecordField::Score => Column::Score,
            RecordField::Province => Column::Province,
            RecordField::ContestType => Column::ContestType,
            RecordField::Level => Column::Level,
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            RecordField::Year | RecordField::Rank | RecordField::Score => FieldKind::Range,
            RecordField::Province | RecordField::ContestType | RecordField::Level => {
                FieldKind::Set
            }
        }
    }

    /// Name of the field in the query document
    pub fn key(self) -> &'static str {
        match self {
            RecordField::Year => "year_range",
            RecordField::Rank => "rank_range",
            RecordField::Score => "score_range",
            RecordField::Province => "province",
            RecordField::ContestType => "contest_type",
            RecordField::Level => "level_range",
        }
    }
}

/// A field's value, erased to what compilation needs
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Range {
        min: Option<BoundValue>,
        max: Option<BoundValue>,
    },
    Set(&'a SetFilter),
}

fn range<T: Copy + Into<BoundValue>>(bound: &RangeBound<T>) -> FieldValue<'static> {
    FieldValue::Range {
        min: bound.min.map(Into::into),
        max: bound.max.map(Into::into),
    }
}

/// Read one field out of a constraint
pub fn field_value(constraint: &RecordConstraint, field: RecordField) -> FieldValue<'_> {
    match field {
        RecordField::Year => range(&constraint.year_range),
        RecordField::Rank => range(&constraint.rank_range),
        RecordField::Score => range(&constraint.score_range),
        RecordField::Province => FieldValue::Set(&constraint.province),
        RecordField::ContestType => FieldValue::Set(&constraint.contest_type),
        RecordField::Level => FieldValue::Set(&constraint.level_range),
    }
}

/// Compile a record constraint; an all-unconstrained one yields the tautology
pub fn compile(constraint: &RecordConstraint) -> Predicate {
    let mut predicate = Predicate::always();

    for field in RecordField::ALL {
        let column = field.column();
        match field_value(constraint, field) {
            FieldValue::Range { min, max } => {
                if let Some(min) = min {
                    predicate.push(Condition::at_least(column, min));
                }
                if let Some(max) = max {
                    predicate.push(Condition::at_most(column, max));
                }
            }
            FieldValue::Set(filter) => {
                if let Some(values) = filter.values() {
                    predicate.push(Condition::one_of(column, values.iter().map(String::as_str)));
                }
            }
        }
    }

    predicate
}
