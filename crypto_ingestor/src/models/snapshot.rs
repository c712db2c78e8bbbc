//! The unmodified response of one market listing request.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use serde_json::Value;

/// `strftime` pattern of the snapshot key suffix (`crypto_<YYYYMMDD_HHMMSS>`).
pub const SNAPSHOT_KEY_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Raw market listing as returned by the provider, captured at a single instant.
///
/// The payload is kept as a semi-structured [`Value`]; nothing about its shape is
/// trusted until the transform stage validates it.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshotRaw {
    /// Instant the response was received.
    pub captured_at: DateTime<Utc>,
    /// Parsed JSON body, expected to be an array of per-asset objects.
    pub payload: Value,
    /// Where the snapshot was persisted.
    pub path: PathBuf,
}

impl MarketSnapshotRaw {
    /// Storage key derived from the capture instant, e.g. `crypto_20250101_120000`.
    pub fn key(&self) -> String {
        snapshot_key("crypto", self.captured_at.naive_utc())
    }

    /// Number of per-asset records, or 0 when the payload is not an array.
    pub fn record_count(&self) -> usize {
        self.payload.as_array().map_or(0, Vec::len)
    }

    /// True when the payload carries no data: `null`, an empty array or an empty object.
    pub fn is_empty(&self) -> bool {
        match &self.payload {
            Value::Null => true,
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }
}

/// `<prefix>_<YYYYMMDD_HHMMSS>`.
pub fn snapshot_key(prefix: &str, at: NaiveDateTime) -> String {
    format!("{prefix}_{}", at.format(SNAPSHOT_KEY_FORMAT))
}

/// Collection timestamp for one cycle: UTC wall clock truncated to whole seconds.
///
/// Snapshot file names and stored `DATETIME` values are therefore UTC, not local time.
pub fn collection_timestamp(now: DateTime<Utc>) -> NaiveDateTime {
    now.trunc_subsecs(0).naive_utc()
}
