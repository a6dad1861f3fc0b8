//! Core types and trait definitions for the DataPulse pipeline.
//!
//! This crate is deliberately free of HTTP, database and object-storage
//! dependencies. It describes the tables of the three tiers and the
//! [`Warehouse`](warehouse::Warehouse) seam every stage writes through.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod bronze;
pub mod error;
pub mod gold;
pub mod silver;
pub mod table;
pub mod warehouse;

pub use error::{Error, Result};
pub use table::{Column, ColumnType, Layer, Record, Row, TableRef, Value};
pub use warehouse::Warehouse;
