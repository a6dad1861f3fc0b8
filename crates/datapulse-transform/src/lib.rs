//! Silver and gold transformations.
//!
//! Both stages are driven by a static [`Plan`](plan::Plan): an ordered list
//! of steps with declared input and output tables. Every step reads whole
//! tables through the [`Warehouse`](datapulse_core::Warehouse) seam, applies
//! a pure function, and replaces its output table.

pub mod error;
pub mod gold;
pub mod plan;
pub mod pseudonym;
pub mod silver;
pub mod summary;

pub use error::{Error, Result};
pub use plan::{GOLD_PLAN, Plan, SILVER_PLAN, Step};

#[cfg(test)]
mod tests;
