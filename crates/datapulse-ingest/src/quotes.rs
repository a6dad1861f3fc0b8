//! Quote scraper (`quotes.toscrape.com`).

use chrono::{DateTime, Utc};
use datapulse_core::{Warehouse, bronze::RawQuote};
use scraper::Html;

use crate::{
  Result,
  bronze::{BronzeContext, land},
  fetch::PageSource,
  html::{first_text, selector, text_of},
  paginate::scrape_pages,
};

pub const ARCHIVE_KEY: &str = "quotes/quotes_raw.json";

pub fn parse_quotes_page(html: &str, ingested_at: DateTime<Utc>) -> Result<Vec<RawQuote>> {
  let doc = Html::parse_document(html);
  let block = selector(".quote")?;
  let text = selector(".text")?;
  let author = selector(".author")?;
  let tag = selector(".tags .tag")?;

  let quotes = doc
    .select(&block)
    .map(|el| {
      let tags: Vec<String> = el.select(&tag).filter_map(text_of).collect();
      RawQuote {
        quote: first_text(el, &text),
        author: first_text(el, &author),
        tags: (!tags.is_empty()).then(|| tags.join(",")),
        ingested_at,
      }
    })
    .collect();

  Ok(quotes)
}

pub async fn run<W: Warehouse, S: PageSource>(ctx: &BronzeContext<'_, W, S>) -> Result<usize> {
  let pagination = ctx.sources.quotes.pagination();
  let quotes = scrape_pages(ctx.source, "quotes", pagination, |html| {
    parse_quotes_page(html, Utc::now())
  })
  .await;
  land(ctx, quotes, ARCHIVE_KEY).await
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_text_author_and_tags() {
    let html = r#"
      <div class="quote">
        <span class="text">  “The world as we have created it is a process of our thinking.” </span>
        <span>by <small class="author"> Albert Einstein </small></span>
        <div class="tags">Tags:
          <a class="tag" href="/tag/change/page/1/">change</a>
          <a class="tag" href="/tag/deep-thoughts/page/1/">deep-thoughts</a>
        </div>
      </div>
      <div class="quote">
        <span class="text">“A day without sunshine is like, you know, night.”</span>
        <span>by <small class="author">Steve Martin</small></span>
        <div class="tags">Tags:</div>
      </div>
    "#;
    let quotes = parse_quotes_page(html, Utc::now()).unwrap();

    assert_eq!(quotes.len(), 2);
    assert_eq!(
      quotes[0].quote.as_deref(),
      Some("“The world as we have created it is a process of our thinking.”")
    );
    assert_eq!(quotes[0].author.as_deref(), Some("Albert Einstein"));
    assert_eq!(quotes[0].tags.as_deref(), Some("change,deep-thoughts"));
    assert_eq!(quotes[1].tags, None);
  }
}
