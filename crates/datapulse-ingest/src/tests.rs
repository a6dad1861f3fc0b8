//! Connector tests against a fake page source, an in-memory warehouse and an
//! in-memory archive.

use std::{collections::HashMap, path::PathBuf, sync::Mutex};

use datapulse_archive::{Archive, Container};
use datapulse_core::{
  Record, Warehouse,
  bronze::{RawBook, RawGeocode, RawLibrary, RawProduct, RawQuote},
};
use datapulse_store_sqlite::SqliteWarehouse;

use crate::{
  BronzeContext, Connector, Error, Page, PageSource, Result, SourcesConfig, bronze, geocode,
};

// ─── Fixtures ────────────────────────────────────────────────────────────────

enum Reply {
  Body(String),
  Fail,
}

/// Serves canned replies; unknown URLs are 404. Records every request.
#[derive(Default)]
struct FakeSource {
  replies:   HashMap<String, Reply>,
  requested: Mutex<Vec<String>>,
}

impl FakeSource {
  fn page(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
    self.replies.insert(url.into(), Reply::Body(body.into()));
    self
  }

  fn failing(mut self, url: impl Into<String>) -> Self {
    self.replies.insert(url.into(), Reply::Fail);
    self
  }

  fn requests(&self) -> Vec<String> {
    self.requested.lock().unwrap().clone()
  }
}

impl PageSource for FakeSource {
  async fn fetch(&self, url: &str) -> Result<Page> {
    self.requested.lock().unwrap().push(url.to_owned());
    match self.replies.get(url) {
      Some(Reply::Body(body)) => Ok(Page::Found(body.clone())),
      None => Ok(Page::NotFound),
      Some(Reply::Fail) => Err(Error::Status { url: url.to_owned(), status: 503 }),
    }
  }
}

fn book_page(titles: &[&str]) -> String {
  let cards: String = titles
    .iter()
    .map(|t| {
      format!(
        r#"<article class="product_pod"><p class="star-rating Two"></p>
           <h3><a title="{t}">{t}</a></h3><p class="price_color">£10.00</p></article>"#
      )
    })
    .collect();
  format!("<html><body>{cards}</body></html>")
}

fn quote_page(quotes: &[(&str, &str)]) -> String {
  quotes
    .iter()
    .map(|(text, author)| {
      format!(
        r#"<div class="quote"><span class="text">{text}</span><small class="author">{author}</small></div>"#
      )
    })
    .collect()
}

fn geo_body(city: &str, postcode: &str) -> String {
  format!(
    r#"{{"features":[{{"geometry":{{"coordinates":[2.35,48.85]}},"properties":{{"city":"{city}","postcode":"{postcode}"}}}}]}}"#
  )
}

const EMPTY_GEO: &str = r#"{"features":[]}"#;

fn quiet_sources() -> SourcesConfig {
  let mut sources = SourcesConfig::default();
  sources.books.delay_ms = 0;
  sources.quotes.delay_ms = 0;
  sources.geocoding.delay_ms = 0;
  sources.geocoding.addresses = vec![];
  sources.libraries.path = PathBuf::from("/nonexistent/partenaire_librairies.xlsx");
  sources
}

fn books_url(page: u32) -> String {
  format!("https://books.toscrape.com/catalogue/page-{page}.html")
}

fn quotes_url(page: u32) -> String {
  format!("https://quotes.toscrape.com/page/{page}/")
}

async fn warehouse() -> SqliteWarehouse {
  SqliteWarehouse::open_in_memory().await.unwrap()
}

// ─── Paged scrapers ──────────────────────────────────────────────────────────

#[tokio::test]
async fn books_stop_at_not_found_and_mirror_to_archive() {
  let w = warehouse().await;
  let archive = Archive::in_memory();
  let sources = quiet_sources();
  let source = FakeSource::default()
    .page(books_url(1), book_page(&["A", "B"]))
    .page(books_url(2), book_page(&["C"]));
  let ctx = BronzeContext { warehouse: &w, source: &source, archive: &archive, sources: &sources };

  let n = Connector::Books.run(&ctx).await.unwrap();
  assert_eq!(n, 3);
  assert_eq!(source.requests(), vec![books_url(1), books_url(2), books_url(3)]);

  let rows: Vec<RawBook> = w.read().await.unwrap();
  let titles: Vec<_> = rows.iter().map(|b| b.title.clone().unwrap()).collect();
  assert_eq!(titles, ["A", "B", "C"]);

  let mirrored: Vec<RawBook> = archive
    .get_json(Container::Raw, "books/books_raw.json")
    .await
    .unwrap();
  assert_eq!(mirrored, rows);
}

#[tokio::test]
async fn failed_page_is_skipped_and_empty_page_stops() {
  let w = warehouse().await;
  let archive = Archive::in_memory();
  let sources = quiet_sources();
  let source = FakeSource::default()
    .failing(books_url(1))
    .page(books_url(2), book_page(&["Survivor"]))
    .page(books_url(3), book_page(&[]))
    .page(books_url(4), book_page(&["Never fetched"]));
  let ctx = BronzeContext { warehouse: &w, source: &source, archive: &archive, sources: &sources };

  let n = Connector::Books.run(&ctx).await.unwrap();
  assert_eq!(n, 1);
  assert_eq!(source.requests().len(), 3);
}

#[tokio::test]
async fn page_cap_bounds_requests() {
  let w = warehouse().await;
  let archive = Archive::in_memory();
  let mut sources = quiet_sources();
  sources.quotes.max_pages = 2;
  let mut source = FakeSource::default();
  for page in 1..=5 {
    source = source.page(quotes_url(page), quote_page(&[("“Q”", "Someone")]));
  }
  let ctx = BronzeContext { warehouse: &w, source: &source, archive: &archive, sources: &sources };

  let n = Connector::Quotes.run(&ctx).await.unwrap();
  assert_eq!(n, 2);
  assert_eq!(source.requests(), vec![quotes_url(1), quotes_url(2)]);
  assert_eq!(w.read::<RawQuote>().await.unwrap().len(), 2);
}

#[tokio::test]
async fn reingestion_appends() {
  let w = warehouse().await;
  let archive = Archive::in_memory();
  let sources = quiet_sources();
  let source = FakeSource::default().page(books_url(1), book_page(&["A"]));
  let ctx = BronzeContext { warehouse: &w, source: &source, archive: &archive, sources: &sources };

  Connector::Books.run(&ctx).await.unwrap();
  Connector::Books.run(&ctx).await.unwrap();
  assert_eq!(w.read::<RawBook>().await.unwrap().len(), 2);
}

// ─── Products ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn product_fetch_failure_lands_an_empty_table() {
  let w = warehouse().await;
  let archive = Archive::in_memory();
  let sources = quiet_sources();
  let source = FakeSource::default().failing(sources.products.url.clone());
  let ctx = BronzeContext { warehouse: &w, source: &source, archive: &archive, sources: &sources };

  assert_eq!(Connector::Products.run(&ctx).await.unwrap(), 0);
  assert!(w.table_exists(RawProduct::TABLE).await.unwrap());
  assert!(w.read::<RawProduct>().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_product_page_lands_an_empty_table() {
  let w = warehouse().await;
  let archive = Archive::in_memory();
  let sources = quiet_sources();
  let source = FakeSource::default();
  let ctx = BronzeContext { warehouse: &w, source: &source, archive: &archive, sources: &sources };

  assert_eq!(Connector::Products.run(&ctx).await.unwrap(), 0);
  assert!(w.read::<RawProduct>().await.unwrap().is_empty());
}

// ─── Geocoding ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn geocoding_skips_addresses_without_candidates() {
  let w = warehouse().await;
  let archive = Archive::in_memory();
  let mut sources = quiet_sources();
  sources.geocoding.addresses = vec!["10 rue de Rivoli Paris".into(), "Nowhere".into()];
  let base = sources.geocoding.url.clone();
  let source = FakeSource::default()
    .page(
      geocode::search_url(&base, "10 rue de Rivoli Paris").unwrap().to_string(),
      geo_body("Paris", "75004"),
    )
    .page(geocode::search_url(&base, "Nowhere").unwrap().to_string(), EMPTY_GEO);
  let ctx = BronzeContext { warehouse: &w, source: &source, archive: &archive, sources: &sources };

  assert_eq!(Connector::Geocoding.run(&ctx).await.unwrap(), 1);
  let rows: Vec<RawGeocode> = w.read().await.unwrap();
  assert_eq!(rows[0].address, "10 rue de Rivoli Paris");
  assert_eq!(rows[0].postal_code.as_deref(), Some("75004"));
}

#[tokio::test]
async fn geocoding_includes_distinct_library_addresses() {
  let w = warehouse().await;
  let archive = Archive::in_memory();
  let mut sources = quiet_sources();
  sources.geocoding.addresses = vec!["1 place Bellecour Lyon".into()];

  let library = |address: &str| RawLibrary {
    library_name:     Some("L".into()),
    address:          Some(address.into()),
    postal_code:      None,
    city:             None,
    contact_name:     None,
    contact_email:    None,
    contact_phone:    None,
    annual_revenue:   None,
    partnership_date: None,
    specialty:        None,
    source:           Some("excel_partenaire".into()),
    ingested_at:      chrono::Utc::now(),
  };
  w.append(vec![
    library("1 place Bellecour Lyon"),
    library("3 rue Oberkampf Paris"),
    library("3 rue Oberkampf Paris"),
  ])
  .await
  .unwrap();

  let source = FakeSource::default();
  let ctx = BronzeContext { warehouse: &w, source: &source, archive: &archive, sources: &sources };
  Connector::Geocoding.run(&ctx).await.unwrap();

  let base = &sources.geocoding.url;
  assert_eq!(source.requests(), vec![
    geocode::search_url(base, "1 place Bellecour Lyon").unwrap().to_string(),
    geocode::search_url(base, "3 rue Oberkampf Paris").unwrap().to_string(),
  ]);
}

// ─── Stage ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn failing_connector_does_not_stop_the_others() {
  let w = warehouse().await;
  let archive = Archive::in_memory();
  let sources = quiet_sources();
  let source = FakeSource::default()
    .page(books_url(1), book_page(&["A"]))
    .page(quotes_url(1), quote_page(&[("“Q”", "Someone")]));
  let ctx = BronzeContext { warehouse: &w, source: &source, archive: &archive, sources: &sources };

  let err = bronze::run(&ctx).await.unwrap_err();
  assert!(matches!(&err, Error::ConnectorsFailed(names) if names == &["libraries".to_string()]));

  assert_eq!(w.read::<RawBook>().await.unwrap().len(), 1);
  assert_eq!(w.read::<RawQuote>().await.unwrap().len(), 1);
  // Products page is missing from the fake and geocoding has no input; both
  // still finish and create their tables.
  assert!(w.read::<RawProduct>().await.unwrap().is_empty());
  assert!(w.read::<RawGeocode>().await.unwrap().is_empty());
}

#[tokio::test]
async fn product_outage_still_creates_every_bronze_table() {
  let w = warehouse().await;
  let archive = Archive::in_memory();
  let sources = quiet_sources();
  let source = FakeSource::default()
    .page(books_url(1), book_page(&["A"]))
    .page(quotes_url(1), quote_page(&[("“Q”", "Someone")]))
    .failing(sources.products.url.clone());
  let ctx = BronzeContext { warehouse: &w, source: &source, archive: &archive, sources: &sources };

  // Only the missing spreadsheet fails the stage; every table still exists.
  assert!(bronze::run(&ctx).await.is_err());
  for table in [RawBook::TABLE, RawQuote::TABLE, RawProduct::TABLE, RawGeocode::TABLE] {
    assert!(w.table_exists(table).await.unwrap(), "{table} missing");
  }
}
