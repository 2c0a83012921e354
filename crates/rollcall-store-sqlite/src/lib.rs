//! SQLite backend for the rollcall attendance store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The domain's uniqueness rules live in
//! the schema as unique indexes, not in application-level check-then-write
//! logic, so they hold even if a duplicate check is raced.

mod encode;
mod schema;
mod store;

pub use store::SqliteStore;
