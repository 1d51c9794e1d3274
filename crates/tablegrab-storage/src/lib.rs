//! tablegrab Storage Layer
//!
//! A single async key-value namespace holding JSON values.
//! Backed by SQLite for the real extension state, or by memory in tests.

mod database;
mod error;
mod memory;
mod migrations;
mod store;

pub use database::Database;
pub use error::StorageError;
pub use memory::MemoryStore;
pub use store::{KeyValueStore, SqliteStore};

pub type Result<T> = std::result::Result<T, StorageError>;
