//! Page loop shared by the paginated scrapers.

use tracing::{debug, error, info};

use crate::{
  Result,
  config::Pagination,
  fetch::{Page, PageSource},
};

/// Fetch pages `1..=max_pages` and parse each with `parse`.
///
/// Stops early on a 404 or on a page that parses to zero records. A page that
/// fails to fetch or parse is logged and skipped. `parse` runs synchronously
/// between fetches so parsed documents never live across an await point.
pub(crate) async fn scrape_pages<S, T, F>(
  source: &S,
  label: &'static str,
  pagination: Pagination<'_>,
  parse: F,
) -> Vec<T>
where
  S: PageSource,
  T: Send,
  F: Fn(&str) -> Result<Vec<T>> + Send,
{
  let mut records = Vec::new();

  for page in 1..=pagination.max_pages {
    if page > 1 && !pagination.delay.is_zero() {
      tokio::time::sleep(pagination.delay).await;
    }

    let url = pagination.page_url(page);
    debug!(source = label, page, %url, "fetching page");

    let body = match source.fetch(&url).await {
      Ok(Page::Found(body)) => body,
      Ok(Page::NotFound) => {
        info!(source = label, page, "page not found, end of data");
        break;
      }
      Err(e) => {
        error!(source = label, page, error = %e, "page fetch failed, skipping");
        continue;
      }
    };

    match parse(&body) {
      Ok(items) if items.is_empty() => {
        info!(source = label, page, "empty page, end of data");
        break;
      }
      Ok(items) => {
        info!(source = label, page, records = items.len(), "scraped page");
        records.extend(items);
      }
      Err(e) => {
        error!(source = label, page, error = %e, "page parse failed, skipping");
      }
    }
  }

  records
}
