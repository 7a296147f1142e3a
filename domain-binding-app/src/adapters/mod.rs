//! Storage adapters for hosts that do not bring their own persistence.

mod memory;

pub use memory::InMemoryStore;

#[cfg(feature = "sqlite-store")]
mod sqlite;

#[cfg(feature = "sqlite-store")]
pub use sqlite::SqliteStore;
