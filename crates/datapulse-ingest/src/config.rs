//! Connector settings, deserialised from the `[http]` and `[sources.*]`
//! config sections. Every field has a default so the pipeline runs without a
//! config file.

use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
  pub user_agent:   String,
  pub timeout_secs: u64,
}

impl Default for HttpConfig {
  fn default() -> Self {
    Self { user_agent: "DataPulseBot/1.0".into(), timeout_secs: 10 }
  }
}

/// Pagination parameters shared by the paged scrapers.
#[derive(Debug, Clone, Copy)]
pub struct Pagination<'a> {
  /// `{page}` is replaced by the 1-based page number.
  pub url_template: &'a str,
  pub max_pages:    u32,
  pub delay:        Duration,
}

impl Pagination<'_> {
  pub fn page_url(&self, page: u32) -> String {
    self.url_template.replace("{page}", &page.to_string())
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BooksConfig {
  pub url_template: String,
  pub max_pages:    u32,
  pub delay_ms:     u64,
}

impl BooksConfig {
  pub fn pagination(&self) -> Pagination<'_> {
    Pagination {
      url_template: &self.url_template,
      max_pages:    self.max_pages,
      delay:        Duration::from_millis(self.delay_ms),
    }
  }
}

impl Default for BooksConfig {
  fn default() -> Self {
    Self {
      url_template: "https://books.toscrape.com/catalogue/page-{page}.html".into(),
      max_pages:    50,
      delay_ms:     1000,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuotesConfig {
  pub url_template: String,
  pub max_pages:    u32,
  pub delay_ms:     u64,
}

impl QuotesConfig {
  pub fn pagination(&self) -> Pagination<'_> {
    Pagination {
      url_template: &self.url_template,
      max_pages:    self.max_pages,
      delay:        Duration::from_millis(self.delay_ms),
    }
  }
}

impl Default for QuotesConfig {
  fn default() -> Self {
    Self {
      url_template: "https://quotes.toscrape.com/page/{page}/".into(),
      max_pages:    50,
      delay_ms:     1000,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProductsConfig {
  pub url: String,
}

impl Default for ProductsConfig {
  fn default() -> Self {
    Self { url: "https://webscraper.io/test-sites/e-commerce/allinone".into() }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
  pub url:                       String,
  pub addresses:                 Vec<String>,
  /// Also geocode every distinct address already in `bronze.libraries_raw`.
  pub include_library_addresses: bool,
  pub delay_ms:                  u64,
}

impl GeocodingConfig {
  pub fn delay(&self) -> Duration {
    Duration::from_millis(self.delay_ms)
  }
}

impl Default for GeocodingConfig {
  fn default() -> Self {
    Self {
      url:                       "https://api-adresse.data.gouv.fr/search/".into(),
      addresses:                 vec![
        "15 rue des Francs Bourgeois Paris".into(),
        "10 rue de Rivoli Paris".into(),
      ],
      include_library_addresses: true,
      delay_ms:                  50,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrariesConfig {
  pub path: PathBuf,
}

impl Default for LibrariesConfig {
  fn default() -> Self {
    Self { path: PathBuf::from("data/partenaire_librairies.xlsx") }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
  pub books:     BooksConfig,
  pub quotes:    QuotesConfig,
  pub products:  ProductsConfig,
  pub geocoding: GeocodingConfig,
  pub libraries: LibrariesConfig,
}
