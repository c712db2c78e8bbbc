//! Diesel models mapping to [`crate::schema`].
//!
//! - [`NewMarketRow`]: insertable, already coerced to the `market_data` column map.
//! - [`NewMarketDocumentRow`]: insertable `market_data_json` row.
//! - [`MarketRow`] / [`MarketDocumentRow`]: read-back forms.

use chrono::NaiveDateTime;
use crypto_ingestor::models::{MarketRecordDocument, MarketRecordTabular};
use diesel::prelude::*;

use crate::{
    columns::{
        ID_WIDTH, NAME_WIDTH, PRICE_PRECISION, PRICE_SCALE, SYMBOL_WIDTH, fit_decimal,
        truncate_text,
    },
    schema::{market_data, market_data_json},
};

/// Insertable form of one tabular record.
#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = market_data)]
pub struct NewMarketRow {
    /// Asset id, at most 64 chars.
    pub id: String,
    /// Ticker, at most 32 chars.
    pub symbol: String,
    /// Display name, at most 128 chars.
    pub name: String,
    /// Exact decimal text with at most 8 fractional digits; NULL if it does not fit.
    pub current_price: Option<String>,
    /// Market capitalisation.
    pub market_cap: Option<i64>,
    /// 24h volume.
    pub total_volume: Option<i64>,
    /// Collection time.
    pub timestamp: NaiveDateTime,
}

impl From<&MarketRecordTabular> for NewMarketRow {
    fn from(r: &MarketRecordTabular) -> Self {
        Self {
            id: truncate_text(&r.id, ID_WIDTH),
            symbol: truncate_text(&r.symbol, SYMBOL_WIDTH),
            name: truncate_text(&r.name, NAME_WIDTH),
            current_price: r
                .current_price
                .and_then(|p| fit_decimal(p, PRICE_PRECISION, PRICE_SCALE))
                .map(|p| p.to_string()),
            market_cap: r.market_cap,
            total_volume: r.total_volume,
            timestamp: r.timestamp,
        }
    }
}

/// Insertable form of one document record.
#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = market_data_json)]
pub struct NewMarketDocumentRow {
    /// The document's collection time.
    pub collected_at: NaiveDateTime,
    /// The document serialized as one JSON object.
    pub payload: String,
}

impl TryFrom<&MarketRecordDocument> for NewMarketDocumentRow {
    type Error = serde_json::Error;

    fn try_from(doc: &MarketRecordDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            collected_at: doc.timestamp,
            payload: serde_json::to_string(doc)?,
        })
    }
}

/// A row read back from `market_data`.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = market_data, check_for_backend(diesel::sqlite::Sqlite))]
pub struct MarketRow {
    /// Asset id.
    pub id: String,
    /// Ticker.
    pub symbol: String,
    /// Display name.
    pub name: String,
    /// Price as SQLite hands it back (numeric affinity may have normalised it).
    pub current_price: Option<String>,
    /// Market capitalisation.
    pub market_cap: Option<i64>,
    /// 24h volume.
    pub total_volume: Option<i64>,
    /// Collection time.
    pub timestamp: NaiveDateTime,
}

/// A row read back from `market_data_json`.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = market_data_json, check_for_backend(diesel::sqlite::Sqlite))]
pub struct MarketDocumentRow {
    /// Collection time.
    pub collected_at: NaiveDateTime,
    /// Serialized document.
    pub payload: String,
}
