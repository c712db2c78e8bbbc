pub mod record;
pub mod request_params;
pub mod snapshot;

pub use record::{MarketRecordDocument, MarketRecordTabular};
pub use request_params::{MarketOrder, MarketsRequestParams};
pub use snapshot::MarketSnapshotRaw;
