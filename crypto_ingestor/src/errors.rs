use thiserror::Error;

use crate::{io::SnapshotError, providers::ProviderError};

/// Why an extraction produced no snapshot.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The provider call failed (network, HTTP status, undecodable body).
    #[error("provider call failed: {0}")]
    Provider(#[from] ProviderError),

    /// The response arrived but could not be persisted.
    #[error("raw snapshot could not be stored: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Why a payload could not be shaped into records.
///
/// A transform either produces every record or none of them.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The payload is not a JSON array of records.
    #[error("expected a JSON array of market records, found {found}")]
    NotAnArray { found: &'static str },

    /// One element of the array is not a JSON object.
    #[error("record {index} is not a JSON object (found {found})")]
    NotAnObject { index: usize, found: &'static str },

    /// A required field is absent from one record.
    #[error("record {index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    /// The processed snapshot could not be persisted.
    #[error("processed snapshot could not be stored: {0}")]
    Snapshot(#[from] SnapshotError),
}
