//! E-commerce test-site scraper (`webscraper.io`). A single page, no
//! pagination.

use chrono::{DateTime, Utc};
use datapulse_core::{Warehouse, bronze::RawProduct};
use scraper::{ElementRef, Html, Selector};
use tracing::{error, warn};

use crate::{
  Result,
  bronze::{BronzeContext, land},
  fetch::{Page, PageSource},
  html::{first_text, selector, text_of},
};

const SOURCE: &str = "webscraper.io";
pub const ARCHIVE_KEY: &str = "products/products_raw.json";

struct CardSelectors {
  title:       Selector,
  price:       Selector,
  description: Selector,
  caption:     Selector,
}

/// Parse every `.thumbnail` card. A card without a name or a numeric price is
/// skipped with a warning.
pub fn parse_products_page(html: &str, ingested_at: DateTime<Utc>) -> Result<Vec<RawProduct>> {
  let doc = Html::parse_document(html);
  let card = selector(".thumbnail")?;
  let sel = CardSelectors {
    title:       selector(".caption .title")?,
    price:       selector(".caption .price")?,
    description: selector(".caption .description")?,
    caption:     selector(".caption a")?,
  };

  let mut products = Vec::new();
  for (index, el) in doc.select(&card).enumerate() {
    match parse_card(el, &sel, ingested_at) {
      Ok(product) => products.push(product),
      Err(reason) => warn!(card = index, reason, "skipping product card"),
    }
  }
  Ok(products)
}

fn parse_card(
  el: ElementRef<'_>,
  sel: &CardSelectors,
  ingested_at: DateTime<Utc>,
) -> Result<RawProduct, &'static str> {
  let title = el.select(&sel.title).next().ok_or("no title")?;
  let name = title
    .value()
    .attr("title")
    .map(|t| t.trim().to_owned())
    .filter(|t| !t.is_empty())
    .or_else(|| text_of(title))
    .ok_or("empty title")?;

  let price_text = first_text(el, &sel.price).ok_or("no price")?;
  let price = parse_dollars(&price_text).ok_or("price is not a number")?;

  let category = el
    .select(&sel.caption)
    .next()
    .and_then(|a| a.value().attr("href"))
    .and_then(|href| href.trim_end_matches('/').rsplit('/').next())
    .filter(|segment| !segment.is_empty())
    .map(str::to_owned);

  Ok(RawProduct {
    product_name: Some(name),
    price: Some(price),
    description: first_text(el, &sel.description),
    category,
    source: Some(SOURCE.into()),
    ingested_at,
  })
}

fn parse_dollars(text: &str) -> Option<f64> {
  text.replace(['$', ','], "").trim().parse().ok()
}

pub async fn run<W: Warehouse, S: PageSource>(ctx: &BronzeContext<'_, W, S>) -> Result<usize> {
  let url = &ctx.sources.products.url;

  // The table is landed even when the page is unavailable, so silver finds
  // an empty source instead of a missing one.
  let products = match ctx.source.fetch(url).await {
    Ok(Page::Found(body)) => parse_products_page(&body, Utc::now())?,
    Ok(Page::NotFound) => {
      error!(%url, "product page not found, nothing recorded");
      Vec::new()
    }
    Err(e) => {
      error!(%url, error = %e, "product page fetch failed, nothing recorded");
      Vec::new()
    }
  };

  land(ctx, products, ARCHIVE_KEY).await
}
