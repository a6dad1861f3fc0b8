//! Integration tests for `SqliteWarehouse` against in-memory and on-disk
//! databases.

use chrono::{NaiveDate, TimeZone, Utc};
use datapulse_core::{
  Record, Warehouse,
  bronze::RawBook,
  gold::DimGeo,
  silver::{Book, Library},
};

use crate::{Error, SqliteWarehouse};

async fn warehouse() -> SqliteWarehouse {
  SqliteWarehouse::open_in_memory()
    .await
    .expect("in-memory warehouse")
}

fn raw_book(title: &str, price: &str) -> RawBook {
  RawBook {
    title:       Some(title.into()),
    price:       Some(price.into()),
    rating:      Some("Three".into()),
    category:    Some("Fiction".into()),
    source:      Some("books.toscrape.com".into()),
    ingested_at: Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap(),
  }
}

fn book(title: &str, price: f64) -> Book {
  Book {
    title:    title.into(),
    price,
    rating:   None,
    category: "Unknown".into(),
    source:   None,
  }
}

// ─── Append ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn append_creates_table_and_preserves_order() {
  let w = warehouse().await;
  assert!(!w.table_exists(RawBook::TABLE).await.unwrap());

  let n = w
    .append(vec![raw_book("B", "£2.00"), raw_book("A", "£1.00")])
    .await
    .unwrap();
  assert_eq!(n, 2);
  assert!(w.table_exists(RawBook::TABLE).await.unwrap());

  let rows: Vec<RawBook> = w.read().await.unwrap();
  assert_eq!(rows, vec![raw_book("B", "£2.00"), raw_book("A", "£1.00")]);
}

#[tokio::test]
async fn append_keeps_existing_rows() {
  let w = warehouse().await;
  w.append(vec![raw_book("A", "£1.00")]).await.unwrap();
  w.append(vec![raw_book("A", "£1.00")]).await.unwrap();

  let rows: Vec<RawBook> = w.read().await.unwrap();
  assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn append_of_nothing_still_creates_table() {
  let w = warehouse().await;
  let n = w.append(Vec::<RawBook>::new()).await.unwrap();
  assert_eq!(n, 0);
  assert!(w.table_exists(RawBook::TABLE).await.unwrap());
  assert!(w.read::<RawBook>().await.unwrap().is_empty());
}

// ─── Replace ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn replace_drops_previous_contents() {
  let w = warehouse().await;
  w.replace(vec![book("Old", 1.0), book("Older", 2.0)])
    .await
    .unwrap();
  w.replace(vec![book("New", 3.0)]).await.unwrap();

  let rows: Vec<Book> = w.read().await.unwrap();
  assert_eq!(rows, vec![book("New", 3.0)]);
}

#[tokio::test]
async fn replace_with_empty_leaves_empty_table() {
  let w = warehouse().await;
  w.replace(vec![book("Old", 1.0)]).await.unwrap();
  w.replace(Vec::<Book>::new()).await.unwrap();

  assert!(w.table_exists(Book::TABLE).await.unwrap());
  assert!(w.read::<Book>().await.unwrap().is_empty());
}

#[tokio::test]
async fn nullable_and_date_columns_round_trip() {
  let w = warehouse().await;
  let lib = Library {
    library_name:     Some("Shakespeare & Co".into()),
    address:          None,
    postal_code:      None,
    city:             Some("Paris".into()),
    contact_id:       Some("user_17".into()),
    annual_revenue:   None,
    partnership_date: NaiveDate::from_ymd_opt(2022, 2, 28),
    specialty:        Some("anglophone".into()),
    source:           None,
  };
  w.replace(vec![lib.clone()]).await.unwrap();

  let rows: Vec<Library> = w.read().await.unwrap();
  assert_eq!(rows, vec![lib]);

  let geo = DimGeo { geo_key: 1, city: "Paris".into(), postal_code: None };
  w.replace(vec![geo.clone()]).await.unwrap();
  assert_eq!(w.read::<DimGeo>().await.unwrap(), vec![geo]);
}

// ─── Reads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn read_missing_table_is_an_error() {
  let w = warehouse().await;
  let err = w.read::<RawBook>().await.unwrap_err();
  assert!(matches!(err, Error::MissingTable(ref t) if t == "bronze.books_raw"));
}

#[tokio::test]
async fn layers_are_separate_namespaces() {
  let w = warehouse().await;
  w.append(vec![raw_book("A", "£1.00")]).await.unwrap();

  // Same bare name in another layer must not be visible.
  assert!(w.table_exists(RawBook::TABLE).await.unwrap());
  let silver_books_raw = datapulse_core::TableRef::new(datapulse_core::Layer::Silver, "books_raw");
  assert!(!w.table_exists(silver_books_raw).await.unwrap());
}

#[tokio::test]
async fn ensure_layers_is_idempotent() {
  let w = warehouse().await;
  w.ensure_layers().await.unwrap();
  w.ensure_layers().await.unwrap();

  let attached = w.attached_layers().await.unwrap();
  for layer in ["bronze", "silver", "gold"] {
    assert_eq!(attached.iter().filter(|n| *n == layer).count(), 1);
  }
}

#[tokio::test]
async fn silver_library_table_has_no_pii_columns() {
  let w = warehouse().await;
  w.replace(Vec::<Library>::new()).await.unwrap();

  let columns: Vec<String> = w
    .conn
    .call(|conn| {
      let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('libraries_clean', 'silver')")?;
      let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      Ok(names)
    })
    .await
    .unwrap();

  assert!(columns.contains(&"contact_id".to_string()));
  assert!(!columns.iter().any(|c| c == "contact_email" || c == "contact_phone"));
}

// ─── On-disk ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn on_disk_warehouse_persists_across_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let root = dir.path().join("warehouse");

  let w = SqliteWarehouse::open(&root).await.unwrap();
  w.append(vec![raw_book("A", "£1.00")]).await.unwrap();
  w.close().await.unwrap();

  for layer in ["bronze.db", "silver.db", "gold.db"] {
    assert!(root.join(layer).exists(), "{layer} was not created");
  }

  let w = SqliteWarehouse::open(&root).await.unwrap();
  let rows: Vec<RawBook> = w.read().await.unwrap();
  assert_eq!(rows, vec![raw_book("A", "£1.00")]);
  w.close().await.unwrap();
}
