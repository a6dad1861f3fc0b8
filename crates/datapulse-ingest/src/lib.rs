//! Source connectors for the DataPulse bronze tier.
//!
//! Each connector fetches raw records from one external source, appends them
//! to its bronze table, and mirrors the same payload to the raw archive as a
//! JSON document. HTTP goes through the [`PageSource`] seam so connectors can
//! be exercised offline; HTML parsing is pure and lives next to each
//! connector.
//!
//! ```text
//! bronze::run
//!   ├─ books      (paginated HTML)   → bronze.books_raw
//!   ├─ quotes     (paginated HTML)   → bronze.quotes_raw
//!   ├─ libraries  (spreadsheet)      → bronze.libraries_raw
//!   ├─ products   (single HTML page) → bronze.ecommerce_raw
//!   └─ geocoding  (REST, per address)→ bronze.geocoding_raw
//! ```

pub mod books;
pub mod bronze;
pub mod config;
pub mod error;
pub mod fetch;
pub mod geocode;
mod html;
mod paginate;
pub mod products;
pub mod quotes;
pub mod spreadsheet;

pub use bronze::{BronzeContext, BronzeReport, Connector};
pub use config::{HttpConfig, SourcesConfig};
pub use error::{Error, Result};
pub use fetch::{HttpSource, Page, PageSource};

#[cfg(test)]
mod tests;
