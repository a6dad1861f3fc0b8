//! Silver and gold stages run end to end against an in-memory warehouse.

use chrono::{NaiveDate, Utc};
use datapulse_archive::{Archive, Container};
use datapulse_core::{
  Record, TableRef, Warehouse,
  bronze::{RawBook, RawGeocode, RawLibrary, RawProduct, RawQuote},
  gold::{DimAuthor, DimBook, DimGeo, DimProduct, FactSalesBook, FactSalesProduct},
  silver::{Book, GeoLibrary, Library, Product, Quote},
};
use datapulse_store_sqlite::SqliteWarehouse;

use crate::{
  Error,
  gold::{self, BuildContext},
  plan::GoldStep,
  silver,
};

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn raw_book(title: &str, price: &str) -> RawBook {
  RawBook {
    title:       Some(title.into()),
    price:       Some(price.into()),
    rating:      Some("Three".into()),
    category:    Some("Fiction".into()),
    source:      Some("books.toscrape.com".into()),
    ingested_at: Utc::now(),
  }
}

fn raw_quote(text: &str, author: &str) -> RawQuote {
  RawQuote {
    quote:       Some(text.into()),
    author:      Some(author.into()),
    tags:        Some("life".into()),
    ingested_at: Utc::now(),
  }
}

fn raw_library(name: &str, address: &str, city: Option<&str>) -> RawLibrary {
  RawLibrary {
    library_name:     Some(name.into()),
    address:          Some(address.into()),
    postal_code:      None,
    city:             city.map(Into::into),
    contact_name:     Some("Jeanne Martin".into()),
    contact_email:    Some("jeanne@example.fr".into()),
    contact_phone:    Some("01 23 45 67 89".into()),
    annual_revenue:   Some(50_000.0),
    partnership_date: Some("01/06/2021".into()),
    specialty:        None,
    source:           Some("excel_partenaire".into()),
    ingested_at:      Utc::now(),
  }
}

fn raw_geocode(address: &str, city: &str, postcode: &str) -> RawGeocode {
  RawGeocode {
    address:     address.into(),
    city:        Some(city.into()),
    postal_code: Some(postcode.into()),
    latitude:    Some(48.85),
    longitude:   Some(2.35),
    ingested_at: Utc::now(),
  }
}

fn raw_product(name: &str, price: f64) -> RawProduct {
  RawProduct {
    product_name: Some(name.into()),
    price:        Some(price),
    description:  None,
    category:     Some("Laptops".into()),
    source:       Some("webscraper.io".into()),
    ingested_at:  Utc::now(),
  }
}

fn day() -> NaiveDate {
  NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

/// A warehouse whose bronze layer holds one small batch of every source.
async fn seeded() -> SqliteWarehouse {
  let w = SqliteWarehouse::open_in_memory().await.unwrap();
  w.append(vec![raw_book("Book A", "£10.00"), raw_book("Book A", "£10.00"), raw_book("Book B", "£5.50")])
    .await
    .unwrap();
  w.append(vec![raw_quote("“Q1”", "Austen"), raw_quote("“Q2”", "Wilde"), raw_quote("“Q1”", "Austen")])
    .await
    .unwrap();
  w.append(vec![
    raw_library("Marais", "15 rue des Francs Bourgeois Paris", Some("Paris")),
    raw_library("Nulle part", "1 chemin inconnu", None),
  ])
  .await
  .unwrap();
  w.append(vec![raw_geocode("15 rue des Francs Bourgeois Paris", "Paris", "75004")])
    .await
    .unwrap();
  w.append(vec![raw_product("Asus", 1000.0), raw_product("Asus", 1000.0), raw_product("Acer", 500.0)])
    .await
    .unwrap();
  w
}

// ─── Silver ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_raw_book_becomes_one_silver_row() {
  let w = seeded().await;
  silver::run(&w).await.unwrap();

  let books: Vec<Book> = w.read().await.unwrap();
  assert_eq!(books.len(), 2);
  assert_eq!(books[0], Book {
    title:    "Book A".into(),
    price:    10.0,
    rating:   Some("Three".into()),
    category: "Fiction".into(),
    source:   Some("books.toscrape.com".into()),
  });
}

#[tokio::test]
async fn silver_run_covers_every_table() {
  let w = seeded().await;
  silver::run(&w).await.unwrap();

  assert_eq!(w.read::<Quote>().await.unwrap().len(), 2);
  assert_eq!(w.read::<Product>().await.unwrap().len(), 2);

  let libraries: Vec<Library> = w.read().await.unwrap();
  assert_eq!(libraries.len(), 2);
  assert!(libraries.iter().all(|l| l.contact_id.as_deref() == Some("user_3170")));
  assert_eq!(libraries[0].partnership_date, NaiveDate::from_ymd_opt(2021, 6, 1));

  let geo: Vec<GeoLibrary> = w.read().await.unwrap();
  assert_eq!(geo.len(), libraries.len());
  assert_eq!(geo[0].geo_postal_code.as_deref(), Some("75004"));
  assert_eq!(geo[1].geo_city, None);
}

#[tokio::test]
async fn silver_is_idempotent() {
  let w = seeded().await;
  silver::run(&w).await.unwrap();
  let first = (
    w.read::<Book>().await.unwrap(),
    w.read::<Quote>().await.unwrap(),
    w.read::<GeoLibrary>().await.unwrap(),
    w.read::<Product>().await.unwrap(),
  );

  silver::run(&w).await.unwrap();
  let second = (
    w.read::<Book>().await.unwrap(),
    w.read::<Quote>().await.unwrap(),
    w.read::<GeoLibrary>().await.unwrap(),
    w.read::<Product>().await.unwrap(),
  );
  assert_eq!(first, second);
}

#[tokio::test]
async fn missing_bronze_table_aborts_silver() {
  let w = SqliteWarehouse::open_in_memory().await.unwrap();
  w.append(vec![raw_book("Book A", "£10.00")]).await.unwrap();

  let err = silver::run(&w).await.unwrap_err();
  assert!(matches!(err, Error::MissingTable(t) if t == RawQuote::TABLE));
  // Steps before the failure have already been written.
  assert!(w.table_exists(Book::TABLE).await.unwrap());
}

#[tokio::test]
async fn empty_product_source_gives_empty_silver_table() {
  let w = SqliteWarehouse::open_in_memory().await.unwrap();
  w.append(vec![raw_book("Book A", "£10.00")]).await.unwrap();
  w.append(vec![raw_quote("“Q1”", "Austen")]).await.unwrap();
  w.append(vec![raw_library("Marais", "15 rue des Francs Bourgeois Paris", Some("Paris"))])
    .await
    .unwrap();
  w.append(Vec::<RawGeocode>::new()).await.unwrap();
  w.append(Vec::<RawProduct>::new()).await.unwrap();

  silver::run(&w).await.unwrap();
  assert!(w.read::<Product>().await.unwrap().is_empty());
}

// ─── Gold ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn gold_builds_dimensions_facts_and_exports() {
  let w = seeded().await;
  silver::run(&w).await.unwrap();
  let archive = Archive::in_memory();
  let ctx = BuildContext { warehouse: &w, archive: Some(&archive), sales_date: day() };

  let report = gold::run(&ctx).await.unwrap();
  assert!(report.skipped.is_empty());

  let books: Vec<DimBook> = w.read().await.unwrap();
  let authors: Vec<DimAuthor> = w.read().await.unwrap();
  let geo: Vec<DimGeo> = w.read().await.unwrap();
  assert_eq!(books.iter().map(|b| b.book_key).collect::<Vec<_>>(), [1, 2]);
  assert_eq!(authors.len(), 2);
  assert_eq!(geo, vec![DimGeo { geo_key: 1, city: "Paris".into(), postal_code: Some("75004".into()) }]);

  let facts: Vec<FactSalesBook> = w.read().await.unwrap();
  assert_eq!(facts.len(), 2 * 2);
  assert!(facts.iter().all(|f| f.geo_key == Some(1) && f.sales_date == day()));

  let products: Vec<FactSalesProduct> = w.read().await.unwrap();
  assert_eq!(products.len(), 2);
  assert_eq!(products[0].sales_amount, 2000.0);

  let exported: Vec<DimProduct> = archive
    .get_json(Container::Exports, "gold/dim_products.json")
    .await
    .unwrap();
  assert_eq!(exported, w.read::<DimProduct>().await.unwrap());

  let summary = report.summary.unwrap();
  assert_eq!(summary.books_revenue, 2.0 * (10.0 + 5.5));
  assert_eq!(summary.products_revenue, 3000.0);
  assert_eq!(summary.top_books[0].title, "Book A");
  assert_eq!(summary.category_revenue, [("Fiction".to_string(), 31.0)]);
  assert_eq!(summary.top_products, [("Asus".to_string(), 2000.0), ("Acer".to_string(), 1000.0)]);
}

#[tokio::test]
async fn missing_geo_source_falls_back_to_null_geo_key() {
  let w = SqliteWarehouse::open_in_memory().await.unwrap();
  w.replace(vec![Book {
    title:    "Solo".into(),
    price:    7.0,
    rating:   None,
    category: "Unknown".into(),
    source:   None,
  }])
  .await
  .unwrap();
  w.replace(vec![Quote { quote: Some("“Q”".into()), author: Some("Austen".into()), tags: None }])
    .await
    .unwrap();
  w.replace(Vec::<Product>::new()).await.unwrap();

  let ctx = BuildContext { warehouse: &w, archive: None, sales_date: day() };
  let report = gold::run(&ctx).await.unwrap();

  assert!(report.skipped.contains(&GoldStep::DimGeo));
  assert!(report.skipped.contains(&GoldStep::DimProducts));
  assert!(report.skipped.contains(&GoldStep::FactSalesProducts));
  assert!(!w.table_exists(DimGeo::TABLE).await.unwrap());

  let facts: Vec<FactSalesBook> = w.read().await.unwrap();
  assert_eq!(facts.len(), 1);
  assert_eq!(facts[0].geo_key, None);
  assert_eq!(facts[0].sales_amount, 7.0);
}

/// Silver holds one book and one author, and nothing to build geo from.
async fn single_book_warehouse() -> SqliteWarehouse {
  let w = SqliteWarehouse::open_in_memory().await.unwrap();
  w.replace(vec![Book {
    title:    "Solo".into(),
    price:    7.0,
    rating:   None,
    category: "Unknown".into(),
    source:   None,
  }])
  .await
  .unwrap();
  w.replace(vec![Quote { quote: Some("“Q”".into()), author: Some("Austen".into()), tags: None }])
    .await
    .unwrap();
  w.replace(Vec::<Product>::new()).await.unwrap();
  w
}

#[tokio::test]
async fn empty_geo_dimension_falls_back_to_null_geo_key() {
  let w = single_book_warehouse().await;
  w.replace(Vec::<DimGeo>::new()).await.unwrap();

  let ctx = BuildContext { warehouse: &w, archive: None, sales_date: day() };
  gold::run(&ctx).await.unwrap();

  assert!(w.table_exists(DimGeo::TABLE).await.unwrap());
  let facts: Vec<FactSalesBook> = w.read().await.unwrap();
  assert_eq!(facts.len(), 1);
  assert!(facts.iter().all(|f| f.geo_key.is_none()));
}

/// Delegates to an inner warehouse but fails every read of `gold.dim_geo`.
struct UnreadableGeo(SqliteWarehouse);

impl Warehouse for UnreadableGeo {
  type Error = datapulse_store_sqlite::Error;

  async fn ensure_layers(&self) -> Result<(), Self::Error> {
    self.0.ensure_layers().await
  }

  async fn append<R: Record>(&self, rows: Vec<R>) -> Result<usize, Self::Error> {
    self.0.append(rows).await
  }

  async fn replace<R: Record>(&self, rows: Vec<R>) -> Result<usize, Self::Error> {
    self.0.replace(rows).await
  }

  async fn read<R: Record>(&self) -> Result<Vec<R>, Self::Error> {
    if R::TABLE == DimGeo::TABLE {
      return Err(datapulse_store_sqlite::Error::MissingTable(R::TABLE.to_string()));
    }
    self.0.read().await
  }

  async fn table_exists(&self, table: TableRef) -> Result<bool, Self::Error> {
    self.0.table_exists(table).await
  }

  async fn close(self) -> Result<(), Self::Error> {
    self.0.close().await
  }
}

#[tokio::test]
async fn unreadable_geo_dimension_falls_back_to_null_geo_key() {
  let inner = single_book_warehouse().await;
  inner
    .replace(vec![DimGeo { geo_key: 1, city: "Paris".into(), postal_code: Some("75004".into()) }])
    .await
    .unwrap();
  let w = UnreadableGeo(inner);

  let ctx = BuildContext { warehouse: &w, archive: None, sales_date: day() };
  gold::run(&ctx).await.unwrap();

  let facts: Vec<FactSalesBook> = w.read().await.unwrap();
  assert_eq!(facts.len(), 1);
  assert!(facts.iter().all(|f| f.geo_key.is_none()));
}

#[tokio::test]
async fn empty_source_keeps_previous_dimension() {
  let w = seeded().await;
  silver::run(&w).await.unwrap();
  let ctx = BuildContext { warehouse: &w, archive: None, sales_date: day() };
  gold::run(&ctx).await.unwrap();
  let before: Vec<DimAuthor> = w.read().await.unwrap();

  w.replace(Vec::<Quote>::new()).await.unwrap();
  let report = gold::run(&ctx).await.unwrap();

  assert!(report.skipped.contains(&GoldStep::DimAuthors));
  assert_eq!(w.read::<DimAuthor>().await.unwrap(), before);
}

#[tokio::test]
async fn gold_rebuild_is_idempotent() {
  let w = seeded().await;
  silver::run(&w).await.unwrap();
  let ctx = BuildContext { warehouse: &w, archive: None, sales_date: day() };

  gold::run(&ctx).await.unwrap();
  let first = (w.read::<DimBook>().await.unwrap(), w.read::<FactSalesBook>().await.unwrap());
  gold::run(&ctx).await.unwrap();
  let second = (w.read::<DimBook>().await.unwrap(), w.read::<FactSalesBook>().await.unwrap());
  assert_eq!(first, second);
}
