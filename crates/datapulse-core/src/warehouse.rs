//! The `Warehouse` trait — the only way stages touch stored tables.
//!
//! Implemented by storage backends (e.g. `datapulse-store-sqlite`). The
//! connectors and transformers depend on this abstraction, not on any
//! concrete backend. A warehouse is an explicitly constructed client: the
//! driver opens it at stage start, passes it by reference into the stage, and
//! closes it on every exit path.

use std::future::Future;

use crate::table::{Record, TableRef};

/// Abstraction over the bronze/silver/gold table store.
///
/// There is no upsert. Bronze tables grow through [`Warehouse::append`];
/// silver and gold tables are only ever written through
/// [`Warehouse::replace`], which drops and recreates the whole table. Each
/// call is atomic on its own; nothing spans several tables.
pub trait Warehouse: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create the bronze, silver and gold namespaces if they are absent.
  fn ensure_layers(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Append rows to `R::TABLE`, creating the table first if needed.
  /// Returns the number of rows written.
  fn append<R: Record>(
    &self,
    rows: Vec<R>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Replace table: drop `R::TABLE` if it exists, recreate it from
  /// `R::COLUMNS`, and bulk-load `rows`. Returns the number of rows written.
  fn replace<R: Record>(
    &self,
    rows: Vec<R>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Read every row of `R::TABLE` in storage (insertion) order.
  ///
  /// Fails if the table does not exist.
  fn read<R: Record>(&self) -> impl Future<Output = Result<Vec<R>, Self::Error>> + Send + '_;

  fn table_exists(
    &self,
    table: TableRef,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Release the underlying connection.
  fn close(self) -> impl Future<Output = Result<(), Self::Error>> + Send
  where
    Self: Sized;
}
