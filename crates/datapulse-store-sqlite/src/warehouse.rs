//! [`SqliteWarehouse`] — the SQLite implementation of [`Warehouse`].

use std::path::{Path, PathBuf};

use datapulse_core::{Layer, Record, TableRef, Warehouse};
use rusqlite::{OptionalExtension as _, types::Value as SqlValue};
use strum::IntoEnumIterator as _;

use crate::{
  Error, Result,
  encode::{decode_row, encode_row},
  schema,
};

/// Where the layer databases live.
#[derive(Debug, Clone)]
enum Location {
  Memory,
  Dir(PathBuf),
}

impl Location {
  fn layer_path(&self, layer: Layer) -> String {
    match self {
      Location::Memory => ":memory:".to_owned(),
      Location::Dir(dir) => dir
        .join(schema::layer_file(layer))
        .to_string_lossy()
        .into_owned(),
    }
  }
}

// ─── Warehouse ───────────────────────────────────────────────────────────────

/// A DataPulse warehouse backed by SQLite.
///
/// The main database holds nothing; each layer is attached under its own
/// schema name. Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteWarehouse {
  pub(crate) conn: tokio_rusqlite::Connection,
  location:       Location,
}

impl SqliteWarehouse {
  /// Open (or create) a warehouse in directory `dir`, creating the directory
  /// and every layer database if absent.
  pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
    let dir = dir.as_ref().to_path_buf();
    tokio::fs::create_dir_all(&dir).await?;

    let conn = tokio_rusqlite::Connection::open(dir.join("warehouse.db")).await?;
    conn
      .call(|conn| {
        conn.execute_batch(schema::FILE_PRAGMAS)?;
        Ok(())
      })
      .await?;

    let warehouse = Self { conn, location: Location::Dir(dir) };
    warehouse.ensure_layers().await?;
    Ok(warehouse)
  }

  /// Open a warehouse whose layers all live in memory.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let warehouse = Self { conn, location: Location::Memory };
    warehouse.ensure_layers().await?;
    Ok(warehouse)
  }

  pub(crate) async fn attached_layers(&self) -> Result<Vec<String>> {
    let names = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT name FROM pragma_database_list")?;
        let names = stmt
          .query_map([], |row| row.get::<_, String>(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
      })
      .await?;
    Ok(names)
  }

  async fn write_table<R: Record>(&self, rows: Vec<R>, replace: bool) -> Result<usize> {
    let table = R::TABLE;
    let create = schema::create_table(table, R::COLUMNS);
    let drop_sql = schema::drop_table(table);
    let insert = schema::insert(table, R::COLUMNS);
    let encoded: Vec<Vec<SqlValue>> = rows.into_iter().map(|r| encode_row(r.to_row())).collect();

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if replace {
          tx.execute(&drop_sql, [])?;
        }
        tx.execute(&create, [])?;
        {
          let mut stmt = tx.prepare(&insert)?;
          for values in &encoded {
            stmt.execute(rusqlite::params_from_iter(values.iter()))?;
          }
        }
        tx.commit()?;
        Ok(encoded.len())
      })
      .await?;

    Ok(written)
  }
}

// ─── Warehouse impl ──────────────────────────────────────────────────────────

impl Warehouse for SqliteWarehouse {
  type Error = Error;

  async fn ensure_layers(&self) -> Result<()> {
    let attached = self.attached_layers().await?;

    for layer in Layer::iter() {
      if attached.iter().any(|name| name == layer.as_ref()) {
        continue;
      }

      let sql = schema::attach(layer);
      let path = self.location.layer_path(layer);
      let on_disk = matches!(self.location, Location::Dir(_));
      let wal = schema::journal_mode(layer);

      self
        .conn
        .call(move |conn| {
          conn.execute(&sql, rusqlite::params![path])?;
          if on_disk {
            conn.query_row(&wal, [], |_| Ok(()))?;
          }
          Ok(())
        })
        .await?;

      tracing::debug!(%layer, "attached layer");
    }

    Ok(())
  }

  async fn append<R: Record>(&self, rows: Vec<R>) -> Result<usize> {
    self.write_table(rows, false).await
  }

  async fn replace<R: Record>(&self, rows: Vec<R>) -> Result<usize> {
    self.write_table(rows, true).await
  }

  async fn read<R: Record>(&self) -> Result<Vec<R>> {
    let table = R::TABLE;
    if !self.table_exists(table).await? {
      return Err(Error::MissingTable(table.to_string()));
    }

    let sql = schema::select_all(table, R::COLUMNS);
    let width = R::COLUMNS.len();

    let raws: Vec<Vec<SqlValue>> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |row| {
            (0..width)
              .map(|i| row.get::<_, SqlValue>(i))
              .collect::<rusqlite::Result<Vec<_>>>()
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|raw| -> Result<R> {
        let row = decode_row(table, R::COLUMNS, raw)?;
        Ok(R::from_row(&row)?)
      })
      .collect()
  }

  async fn table_exists(&self, table: TableRef) -> Result<bool> {
    let sql = schema::table_exists(table.layer);
    let name = table.name;

    let exists = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![name], |_| Ok(true))
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    Ok(exists)
  }

  async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }
}
