//! SQLite backend for the DataPulse warehouse.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Each [`Layer`](datapulse_core::Layer)
//! is a separate attached database, so `bronze.books_raw` is a real
//! schema-qualified name.

mod encode;
mod schema;
mod warehouse;

pub mod error;

pub use error::{Error, Result};
pub use warehouse::SqliteWarehouse;

#[cfg(test)]
mod tests;
