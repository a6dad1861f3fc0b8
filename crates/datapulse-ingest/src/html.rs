//! Small helpers shared by the HTML parsers.

use scraper::{ElementRef, Selector};

use crate::{Error, Result};

pub(crate) fn selector(css: &str) -> Result<Selector> {
  Selector::parse(css).map_err(|e| Error::Selector(format!("{css:?}: {e}")))
}

/// Concatenated, trimmed text content of `el`; `None` when blank.
pub(crate) fn text_of(el: ElementRef<'_>) -> Option<String> {
  let text = el.text().collect::<String>();
  let text = text.trim();
  (!text.is_empty()).then(|| text.to_owned())
}

/// Text of the first descendant of `el` matching `sel`.
pub(crate) fn first_text(el: ElementRef<'_>, sel: &Selector) -> Option<String> {
  el.select(sel).next().and_then(text_of)
}
