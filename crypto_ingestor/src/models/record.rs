//! Per-asset records produced by the transform stage.
//!
//! Two parallel shapes come out of every cycle:
//! - [`MarketRecordTabular`]: strict, typed row for the `market_data` table.
//! - [`MarketRecordDocument`]: loosely-typed JSON mapping for the `market_data_json` table.
//!
//! Both carry the same collection timestamp, captured once per cycle.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `strftime` pattern used when a collection timestamp is rendered as text.
pub const COLLECTED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One typed row per asset per cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketRecordTabular {
    /// Source-assigned asset identifier (e.g. "bitcoin").
    pub id: String,
    /// Ticker symbol (e.g. "btc").
    pub symbol: String,
    /// Display name (e.g. "Bitcoin").
    pub name: String,
    /// Spot price in the quote currency; `None` when the source value does not parse.
    pub current_price: Option<Decimal>,
    /// Market capitalisation; `None` when the source value does not parse.
    pub market_cap: Option<i64>,
    /// 24h traded volume; `None` when the source value does not parse.
    pub total_volume: Option<i64>,
    /// Collection time shared by every row of the cycle.
    pub timestamp: NaiveDateTime,
}

/// One JSON-serializable mapping per asset per cycle.
///
/// Field values are copied verbatim from the source; absent keys become `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecordDocument {
    pub id: Value,
    pub symbol: Value,
    pub name: Value,
    pub current_price: Value,
    pub market_cap: Value,
    pub total_volume: Value,
    /// Collection time, rendered as `YYYY-MM-DD HH:MM:SS`.
    #[serde(with = "collected_at_format")]
    pub timestamp: NaiveDateTime,
}

/// Serde adapter rendering a [`NaiveDateTime`] with [`COLLECTED_AT_FORMAT`].
pub mod collected_at_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use super::COLLECTED_AT_FORMAT;

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&ts.format(COLLECTED_AT_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, COLLECTED_AT_FORMAT).map_err(D::Error::custom)
    }
}
