//! Extract stage: one provider call, one raw snapshot.

use chrono::Utc;
use tracing::{error, info};

use crate::{
    errors::ExtractionError,
    io::SnapshotStore,
    models::{MarketSnapshotRaw, MarketsRequestParams},
    providers::MarketDataProvider,
};

/// Pulls the market listing and persists the response verbatim before handing it on.
pub struct Extractor<P> {
    provider: P,
    params: MarketsRequestParams,
    store: SnapshotStore,
}

impl<P: MarketDataProvider> Extractor<P> {
    pub fn new(provider: P, params: MarketsRequestParams, store: SnapshotStore) -> Self {
        Self {
            provider,
            params,
            store,
        }
    }

    pub fn params(&self) -> &MarketsRequestParams {
        &self.params
    }

    /// Fetch once and write the raw snapshot.
    ///
    /// No retry. On failure nothing is written, so a failed call leaves no trace on disk.
    pub async fn extract(&self) -> Result<MarketSnapshotRaw, ExtractionError> {
        match self.try_extract().await {
            Ok(snapshot) => {
                info!(
                    path = %snapshot.path.display(),
                    records = snapshot.record_count(),
                    "Data extracted successfully"
                );
                Ok(snapshot)
            }
            Err(e) => {
                error!(error = %e, "Data extraction failed");
                Err(e)
            }
        }
    }

    async fn try_extract(&self) -> Result<MarketSnapshotRaw, ExtractionError> {
        let payload = self.provider.fetch_markets(&self.params).await?;
        let captured_at = Utc::now();
        let path = self.store.write_raw(&payload, captured_at.naive_utc())?;

        Ok(MarketSnapshotRaw {
            captured_at,
            payload,
            path,
        })
    }
}
