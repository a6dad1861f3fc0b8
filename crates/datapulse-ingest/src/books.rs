//! Book catalog scraper (`books.toscrape.com`).

use chrono::{DateTime, Utc};
use datapulse_core::{Warehouse, bronze::RawBook};
use scraper::Html;

use crate::{
  Result,
  bronze::{BronzeContext, land},
  fetch::PageSource,
  html::{first_text, selector, text_of},
  paginate::scrape_pages,
};

const CATEGORY: &str = "Books";
const SOURCE: &str = "books.toscrape.com";
pub const ARCHIVE_KEY: &str = "books/books_raw.json";

/// Parse one catalog page. Every `article.product_pod` card becomes a row;
/// nothing is validated here.
pub fn parse_books_page(html: &str, ingested_at: DateTime<Utc>) -> Result<Vec<RawBook>> {
  let doc = Html::parse_document(html);
  let card = selector("article.product_pod")?;
  let link = selector("h3 a")?;
  let price = selector(".price_color")?;
  let rating = selector("p.star-rating")?;

  let books = doc
    .select(&card)
    .map(|el| {
      let title = el.select(&link).next().and_then(|a| {
        a.value()
          .attr("title")
          .map(|t| t.trim().to_owned())
          .or_else(|| text_of(a))
      });
      let rating = el.select(&rating).next().and_then(|p| {
        p.value()
          .classes()
          .find(|c| *c != "star-rating")
          .map(str::to_owned)
      });
      RawBook {
        title,
        price: first_text(el, &price),
        rating,
        category: Some(CATEGORY.into()),
        source: Some(SOURCE.into()),
        ingested_at,
      }
    })
    .collect();

  Ok(books)
}

pub async fn run<W: Warehouse, S: PageSource>(ctx: &BronzeContext<'_, W, S>) -> Result<usize> {
  let pagination = ctx.sources.books.pagination();
  let books = scrape_pages(ctx.source, "books", pagination, |html| {
    parse_books_page(html, Utc::now())
  })
  .await;
  land(ctx, books, ARCHIVE_KEY).await
}
