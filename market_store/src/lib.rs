//! Relational sinks for the crypto market pipeline.
//!
//! [`loader::MarketStore`] appends tabular rows to `market_data` and JSON documents to
//! `market_data_json` in a SQLite database, creating both tables from the explicit
//! column maps in [`columns`]. [`db::probe`] checks a MySQL server for the `db-check`
//! binary.

#![deny(missing_docs)]

pub mod columns;
pub mod db;
pub mod loader;
pub mod models;
pub mod schema;

pub use loader::{LoadError, MarketStore};
