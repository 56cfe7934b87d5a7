//! SQLite Roster Store
//!
//! Persistent (or in-memory) storage using SQLite. Predicates are rendered to
//! a parameterized `WHERE` clause; bound values are never spliced into SQL.
//!
//! # Schema
//!
//! ```text
//! enrollees(uid PK, name, gender, enrollment_year, aggregate_score,
//!           secondary_score, secondary_level)
//! contests(id PK, year, type)
//! contest_records(id PK, uid → enrollees, contest_id → contests,
//!                 score, rank, province, level)
//! record_contest  = VIEW contest_records ⋈ contests
//! ```

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, params_from_iter, Connection, Row};
use tracing::debug;

use crate::domain::models::{Dataset, Enrollee, Gender, Uid};
use crate::domain::ports::{RosterStore, StoreStats};
use crate::domain::predicate::{BoundValue, Condition, Predicate, View};
use crate::Result;

const ENROLLEE_COLUMNS: &str = "uid, name, gender, enrollment_year, aggregate_score, \
                                secondary_score, secondary_level";

impl ToSql for BoundValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            BoundValue::Int(v) => ToSqlOutput::Borrowed(ValueRef::Integer(*v)),
            BoundValue::Real(v) => ToSqlOutput::Borrowed(ValueRef::Real(*v)),
            BoundValue::Text(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
        })
    }
}

/// SQLite-based RosterStore implementation
pub struct SqliteRosterStore {
    conn: Mutex<Connection>,
}

impl SqliteRosterStore {
    /// Open (or create) a store at the given path
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store holding `dataset`
    pub fn from_dataset(dataset: &Dataset) -> Result<Self> {
        let store = Self::in_memory()?;
        store.import(dataset)?;
        Ok(store)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS enrollees (
                uid TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                gender TEXT NOT NULL DEFAULT 'unknown',
                enrollment_year INTEGER NOT NULL,
                aggregate_score REAL NOT NULL,
                secondary_score REAL NOT NULL DEFAULT 0,
                secondary_level TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE IF NOT EXISTS contests (
                id INTEGER PRIMARY KEY,
                year INTEGER NOT NULL,
                type TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS contest_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                uid TEXT NOT NULL,
                contest_id INTEGER NOT NULL,
                score REAL NOT NULL,
                rank INTEGER NOT NULL,
                province TEXT NOT NULL,
                level TEXT NOT NULL,
                FOREIGN KEY (uid) REFERENCES enrollees(uid),
                FOREIGN KEY (contest_id) REFERENCES contests(id)
            );

            CREATE INDEX IF NOT EXISTS idx_enrollees_year
                ON enrollees(enrollment_year);

            CREATE INDEX IF NOT EXISTS idx_records_uid
                ON contest_records(uid);

            CREATE INDEX IF NOT EXISTS idx_records_contest
                ON contest_records(contest_id);

            CREATE VIEW IF NOT EXISTS record_contest AS
                SELECT r.uid AS uid,
                       r.score AS score,
                       r.rank AS rank,
                       r.province AS province,
                       r.level AS level,
                       c.year AS contest_year,
                       c.type AS contest_type
                FROM contest_records r
                JOIN contests c ON c.id = r.contest_id;",
        )?;

        Ok(())
    }

    /// Bulk-load a dataset in one transaction
    ///
    /// This is the hand-off point for the external loader; the filter engine
    /// itself never writes.
    pub fn import(&self, dataset: &Dataset) -> Result<()> {
        let conn = self.conn.lock()?;
        let tx = conn.unchecked_transaction()?;

        {
            let mut insert_enrollee = tx.prepare(
                "INSERT OR REPLACE INTO enrollees
                 (uid, name, gender, enrollment_year, aggregate_score, secondary_score, secondary_level)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for e in &dataset.enrollees {
                insert_enrollee.execute(params![
                    &e.uid,
                    &e.name,
                    e.gender.as_str(),
                    e.enrollment_year,
                    e.aggregate_score,
                    e.secondary_score,
                    &e.secondary_level,
                ])?;
            }

            let mut insert_contest = tx.prepare(
                "INSERT OR REPLACE INTO contests (id, year, type) VALUES (?1, ?2, ?3)",
            )?;
            for c in &dataset.contests {
                insert_contest.execute(params![c.id, c.year, &c.contest_type])?;
            }

            let mut insert_record = tx.prepare(
                "INSERT INTO contest_records (uid, contest_id, score, rank, province, level)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for r in &dataset.records {
                insert_record.execute(params![
                    &r.uid,
                    r.contest_id,
                    r.score,
                    r.rank,
                    &r.province,
                    &r.level,
                ])?;
            }
        }

        tx.commit()?;
        debug!(
            enrollees = dataset.enrollees.len(),
            contests = dataset.contests.len(),
            records = dataset.records.len(),
            "dataset imported"
        );
        Ok(())
    }

    fn row_to_enrollee(row: &Row<'_>) -> rusqlite::Result<Enrollee> {
        let gender: String = row.get(2)?;
        Ok(Enrollee {
            uid: row.get(0)?,
            name: row.get(1)?,
            gender: Gender::from_tag(&gender),
            enrollment_year: row.get(3)?,
            aggregate_score: row.get(4)?,
            secondary_score: row.get(5)?,
            secondary_level: row.get(6)?,
        })
    }
}

/// Render a predicate to a `WHERE` clause with positional `?` placeholders
///
/// Returns an empty string for the tautology.
fn render_where(predicate: &Predicate) -> String {
    if predicate.is_tautology() {
        return String::new();
    }

    let clauses: Vec<String> = predicate
        .conditions()
        .iter()
        .map(|condition| match condition {
            Condition::AtLeast { column, .. } => format!("{} >= ?", column.name()),
            Condition::AtMost { column, .. } => format!("{} <= ?", column.name()),
            Condition::OneOf { column, values } => {
                let placeholders = vec!["?"; values.len()].join(", ");
                format!("{} IN ({})", column.name(), placeholders)
            }
        })
        .collect();

    format!(" WHERE {}", clauses.join(" AND "))
}

impl RosterStore for SqliteRosterStore {
    fn select_uids(&self, view: View, predicate: &Predicate) -> Result<BTreeSet<Uid>> {
        predicate.check(view)?;
        let sql = format!(
            "SELECT DISTINCT uid FROM {}{}",
            view.as_str(),
            render_where(predicate)
        );
        debug!(%view, bound = predicate.bound_value_count(), "select_uids");

        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let uids = stmt
            .query_map(params_from_iter(predicate.bound_values()), |row| {
                row.get::<_, String>(0)
            })?
            .collect::<rusqlite::Result<BTreeSet<_>>>()?;
        Ok(uids)
    }

    fn select_enrollees(&self, predicate: &Predicate) -> Result<Vec<Enrollee>> {
        predicate.check(View::Enrollees)?;
        let sql = format!(
            "SELECT {} FROM enrollees{}",
            ENROLLEE_COLUMNS,
            render_where(predicate)
        );
        debug!(bound = predicate.bound_value_count(), "select_enrollees");

        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let enrollees = stmt
            .query_map(
                params_from_iter(predicate.bound_values()),
                Self::row_to_enrollee,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(enrollees)
    }

    fn stats(&self) -> Result<StoreStats> {
        let conn = self.conn.lock()?;

        let enrollees: i64 =
            conn.query_row("SELECT COUNT(*) FROM enrollees", [], |row| row.get(0))?;
        let contests: i64 =
            conn.query_row("SELECT COUNT(*) FROM contests", [], |row| row.get(0))?;
        let records: i64 =
            conn.query_row("SELECT COUNT(*) FROM record_contest", [], |row| row.get(0))?;

        Ok(StoreStats {
            enrollees: enrollees as usize,
            contests: contests as usize,
            records: records as usize,
        })
    }
}
