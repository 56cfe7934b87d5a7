//! Infrastructure layer - Storage adapters
//!
//! - SQLite adapter (default feature)
//! - In-memory adapter

pub mod memory_store;
pub use memory_store::MemoryRosterStore;

#[cfg(feature = "sqlite")]
pub mod sqlite_store;
#[cfg(feature = "sqlite")]
pub use sqlite_store::SqliteRosterStore;
