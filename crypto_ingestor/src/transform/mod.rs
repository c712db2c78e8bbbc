//! Transform stage: raw payload → tabular rows + JSON documents.
//!
//! Both projections take the cycle's collection timestamp as an argument, so every
//! record of a cycle, in either shape, carries the same instant.
//!
//! The two projections differ in how strict they are:
//! - [`to_tabular`] requires `id`, `symbol`, `name`, `current_price`, `market_cap` and
//!   `total_volume` on every record and fails the whole conversion otherwise.
//! - [`to_document`] substitutes `null` for absent fields and only fails on a payload
//!   that is not an array of objects (or when the processed snapshot cannot be written).

pub mod coerce;

use chrono::NaiveDateTime;
use serde_json::{Map, Value};
use tracing::info;

use crate::{
    errors::TransformError,
    io::SnapshotStore,
    models::{MarketRecordDocument, MarketRecordTabular},
};

use coerce::{parse_decimal, parse_i64, value_to_text};

/// Project the payload into typed rows.
///
/// Text fields are coerced to strings whatever their JSON type; numeric fields are
/// parsed leniently and become `None` when unparseable.
pub fn to_tabular(
    payload: &Value,
    collected_at: NaiveDateTime,
) -> Result<Vec<MarketRecordTabular>, TransformError> {
    records(payload)?
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let obj = as_object(index, item)?;
            let field = |name: &'static str| {
                obj.get(name)
                    .ok_or(TransformError::MissingField { index, field: name })
            };

            Ok(MarketRecordTabular {
                id: value_to_text(field("id")?),
                symbol: value_to_text(field("symbol")?),
                name: value_to_text(field("name")?),
                current_price: parse_decimal(field("current_price")?),
                market_cap: parse_i64(field("market_cap")?),
                total_volume: parse_i64(field("total_volume")?),
                timestamp: collected_at,
            })
        })
        .collect()
}

/// Project the payload into JSON documents without touching the file system.
pub fn build_documents(
    payload: &Value,
    collected_at: NaiveDateTime,
) -> Result<Vec<MarketRecordDocument>, TransformError> {
    records(payload)?
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let obj = as_object(index, item)?;
            let field = |name: &str| obj.get(name).cloned().unwrap_or(Value::Null);

            Ok(MarketRecordDocument {
                id: field("id"),
                symbol: field("symbol"),
                name: field("name"),
                current_price: field("current_price"),
                market_cap: field("market_cap"),
                total_volume: field("total_volume"),
                timestamp: collected_at,
            })
        })
        .collect()
}

/// Project the payload into JSON documents and persist them as the processed snapshot.
pub fn to_document(
    payload: &Value,
    collected_at: NaiveDateTime,
    store: &SnapshotStore,
) -> Result<Vec<MarketRecordDocument>, TransformError> {
    let documents = build_documents(payload, collected_at)?;
    let path = store.write_processed(&documents, collected_at)?;
    info!(path = %path.display(), records = documents.len(), "Transformed JSON written");
    Ok(documents)
}

fn records(payload: &Value) -> Result<&Vec<Value>, TransformError> {
    payload.as_array().ok_or(TransformError::NotAnArray {
        found: json_kind(payload),
    })
}

fn as_object(index: usize, item: &Value) -> Result<&Map<String, Value>, TransformError> {
    item.as_object().ok_or(TransformError::NotAnObject {
        index,
        found: json_kind(item),
    })
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
