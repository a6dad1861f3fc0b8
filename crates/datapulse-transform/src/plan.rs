//! Declarative stage plans.
//!
//! A plan lists its steps in execution order with the tables each one reads
//! and writes. [`Plan::validate`] checks the ordering before anything runs.

use datapulse_core::{
  Layer, Record, TableRef,
  bronze::{RawBook, RawGeocode, RawLibrary, RawProduct, RawQuote},
  gold::{DimAuthor, DimBook, DimGeo, DimProduct, FactSalesBook, FactSalesProduct},
  silver::{Book, GeoLibrary, Library, Product, Quote},
};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SilverStep {
  Books,
  Quotes,
  Libraries,
  GeoEnrichment,
  Products,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum GoldStep {
  DimBooks,
  DimAuthors,
  DimGeo,
  DimProducts,
  FactSalesBooks,
  FactSalesProducts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step<K> {
  pub kind:   K,
  pub inputs: &'static [TableRef],
  pub output: TableRef,
}

#[derive(Debug, Clone, Copy)]
pub struct Plan<K: 'static> {
  /// The layer every step writes to.
  pub layer: Layer,
  pub steps: &'static [Step<K>],
}

pub const SILVER_PLAN: Plan<SilverStep> = Plan {
  layer: Layer::Silver,
  steps: &[
    Step { kind: SilverStep::Books, inputs: &[RawBook::TABLE], output: Book::TABLE },
    Step { kind: SilverStep::Quotes, inputs: &[RawQuote::TABLE], output: Quote::TABLE },
    Step { kind: SilverStep::Libraries, inputs: &[RawLibrary::TABLE], output: Library::TABLE },
    Step {
      kind:   SilverStep::GeoEnrichment,
      inputs: &[Library::TABLE, RawGeocode::TABLE],
      output: GeoLibrary::TABLE,
    },
    Step { kind: SilverStep::Products, inputs: &[RawProduct::TABLE], output: Product::TABLE },
  ],
};

pub const GOLD_PLAN: Plan<GoldStep> = Plan {
  layer: Layer::Gold,
  steps: &[
    Step { kind: GoldStep::DimBooks, inputs: &[Book::TABLE], output: DimBook::TABLE },
    Step { kind: GoldStep::DimAuthors, inputs: &[Quote::TABLE], output: DimAuthor::TABLE },
    Step { kind: GoldStep::DimGeo, inputs: &[GeoLibrary::TABLE], output: DimGeo::TABLE },
    Step { kind: GoldStep::DimProducts, inputs: &[Product::TABLE], output: DimProduct::TABLE },
    Step {
      kind:   GoldStep::FactSalesBooks,
      inputs: &[DimBook::TABLE, DimAuthor::TABLE, DimGeo::TABLE],
      output: FactSalesBook::TABLE,
    },
    Step {
      kind:   GoldStep::FactSalesProducts,
      inputs: &[DimProduct::TABLE],
      output: FactSalesProduct::TABLE,
    },
  ],
};

impl<K: std::fmt::Display> Plan<K> {
  /// Every input in the plan's own layer must be the output of an earlier
  /// step, and every output must live in the plan's layer.
  pub fn validate(&self) -> Result<()> {
    for (i, step) in self.steps.iter().enumerate() {
      if step.output.layer != self.layer {
        return Err(Error::InvalidPlan { step: step.kind.to_string(), input: step.output });
      }

      let produced_earlier = |table: &TableRef| self.steps[..i].iter().any(|s| s.output == *table);
      if let Some(input) = step
        .inputs
        .iter()
        .find(|t| t.layer == self.layer && !produced_earlier(*t))
      {
        return Err(Error::InvalidPlan { step: step.kind.to_string(), input: *input });
      }
    }
    Ok(())
  }
}
