//! Domain layer for the roster store
//!
//! # Domain Models
//!
//! - `Enrollee`: tracked individual (uid, enrollment year, aggregate score)
//! - `Contest`: contest edition (year, type)
//! - `ContestRecord`: one enrollee's result in one contest
//! - `Dataset`: the full reference data handed over by the loader
//!
//! # Predicate IR
//!
//! - `Predicate` / `Condition`: conjunction of bound and membership tests
//! - `View`: the two logical views lookups run against
//!
//! # Port Trait
//!
//! - `RosterStore`: read-only lookup abstraction
//! - `StoreHandle`: write-once slot the engine reads the store through

pub mod models;
pub mod ports;
pub mod predicate;

pub use models::{Contest, ContestId, ContestRecord, Dataset, Enrollee, Gender, Uid};
pub use ports::{RosterStore, StoreHandle, StoreStats};
pub use predicate::{BoundValue, CellRef, Column, Condition, Predicate, RowSource, ValueKind, View};
