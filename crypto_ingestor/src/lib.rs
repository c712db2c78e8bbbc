//! Extraction and shaping of cryptocurrency market listings.
//!
//! - [`providers`]: the [`providers::MarketDataProvider`] seam and the CoinGecko client.
//! - [`extract`]: one fetch per call, raw response persisted before it is returned.
//! - [`transform`]: raw payload → typed rows and JSON documents.
//! - [`io`]: the on-disk snapshot log.

pub mod errors;
pub mod extract;
pub mod io;
pub mod models;
pub mod providers;
pub mod transform;

pub use errors::{ExtractionError, TransformError};
pub use extract::Extractor;
