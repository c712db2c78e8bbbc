//! File-system persistence of captured and processed market data.

pub mod snapshot_store;

pub use snapshot_store::{SnapshotError, SnapshotStore};
