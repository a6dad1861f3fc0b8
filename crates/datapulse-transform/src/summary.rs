//! Reporting figures computed from the gold tables after a build.

use std::collections::HashMap;

use datapulse_core::gold::{DimBook, DimProduct, FactSalesBook, FactSalesProduct};
use serde::Serialize;
use tracing::info;

const TOP_BOOKS: usize = 10;
const TOP_PRODUCTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedBook {
  /// `RANK()` semantics: ties share a rank and the next rank skips.
  pub rank:    usize,
  pub title:   String,
  pub revenue: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
  pub books_revenue:    f64,
  pub products_revenue: f64,
  pub top_books:        Vec<RankedBook>,
  /// Book revenue per category, highest first.
  pub category_revenue: Vec<(String, f64)>,
  /// Product names by revenue, highest first.
  pub top_products:     Vec<(String, f64)>,
}

/// Sum `amount` per label, highest first. Equal totals keep first-seen order.
/// Facts whose key has no label are ignored.
fn revenue_by<'a, F>(
  labels: &HashMap<i64, &'a str>,
  facts: impl IntoIterator<Item = F>,
  key_and_amount: impl Fn(F) -> (i64, f64),
) -> Vec<(&'a str, f64)> {
  let mut totals: Vec<(&str, f64)> = Vec::new();
  for fact in facts {
    let (key, amount) = key_and_amount(fact);
    let Some(&label) = labels.get(&key) else { continue };
    match totals.iter_mut().find(|(l, _)| *l == label) {
      Some((_, revenue)) => *revenue += amount,
      None => totals.push((label, amount)),
    }
  }
  totals.sort_by(|a, b| b.1.total_cmp(&a.1));
  totals
}

fn owned(totals: Vec<(&str, f64)>) -> Vec<(String, f64)> {
  totals.into_iter().map(|(l, r)| (l.to_owned(), r)).collect()
}

impl Summary {
  pub fn compute(
    books: &[DimBook],
    book_facts: &[FactSalesBook],
    products: &[DimProduct],
    product_facts: &[FactSalesProduct],
  ) -> Self {
    let titles: HashMap<i64, &str> = books.iter().map(|b| (b.book_key, b.title.as_str())).collect();
    let categories: HashMap<i64, &str> =
      books.iter().map(|b| (b.book_key, b.category.as_str())).collect();
    let names: HashMap<i64, &str> = products
      .iter()
      .map(|p| (p.product_key, p.product_name.as_str()))
      .collect();

    let per_title = revenue_by(&titles, book_facts, |f| (f.book_key, f.sales_amount));
    let mut top_books: Vec<RankedBook> = Vec::with_capacity(TOP_BOOKS.min(per_title.len()));
    for (i, (title, revenue)) in per_title.iter().take(TOP_BOOKS).enumerate() {
      let rank = match top_books.last() {
        Some(RankedBook { rank, revenue: prev, .. }) if prev == revenue => *rank,
        _ => i + 1,
      };
      top_books.push(RankedBook { rank, title: (*title).to_owned(), revenue: *revenue });
    }

    let mut top_products = revenue_by(&names, product_facts, |f| (f.product_key, f.sales_amount));
    top_products.truncate(TOP_PRODUCTS);

    Self {
      books_revenue: book_facts.iter().map(|f| f.sales_amount).sum(),
      products_revenue: product_facts.iter().map(|f| f.sales_amount).sum(),
      top_books,
      category_revenue: owned(revenue_by(&categories, book_facts, |f| (f.book_key, f.sales_amount))),
      top_products: owned(top_products),
    }
  }

  pub fn log(&self) {
    info!(
      books_revenue = self.books_revenue,
      products_revenue = self.products_revenue,
      "revenue totals"
    );
    for book in &self.top_books {
      info!(rank = book.rank, title = %book.title, revenue = book.revenue, "top book");
    }
    for (category, revenue) in &self.category_revenue {
      info!(%category, revenue, "category revenue");
    }
    for (product, revenue) in &self.top_products {
      info!(%product, revenue, "top product");
    }
  }
}
