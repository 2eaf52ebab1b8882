//! SQLite backend for footy record storage.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! connection thread without blocking the async runtime. Tables are created
//! on demand from an inferred [`footy_core::TableSchema`] and written with
//! single-statement upserts.

mod sql;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
