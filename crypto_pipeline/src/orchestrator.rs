//! One ETL cycle: extract, transform into both shapes, load both shapes.
//!
//! Cycle states run `Extracting → Transforming → Loading → Done`; a failed or empty
//! extraction jumps straight to `Done`. The two shapes are independent from the
//! transform on: a failure in one never stops the other.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, NaiveDateTime, Utc};
use crypto_ingestor::{
    Extractor,
    io::SnapshotStore,
    models::{MarketRecordDocument, MarketRecordTabular, snapshot::collection_timestamp},
    providers::MarketDataProvider,
    transform,
};
use market_store::MarketStore;
use tracing::{debug, error, info, warn};

const BANNER: &str = "=============================";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Extracting,
    Transforming,
    Loading,
    Done,
}

/// Outcome of one stage of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Succeeded,
    Failed,
    /// Never attempted because an earlier stage failed.
    Skipped,
}

impl StageOutcome {
    fn from_ok(ok: bool) -> Self {
        if ok { Self::Succeeded } else { Self::Failed }
    }

    pub fn is_success(self) -> bool {
        self == Self::Succeeded
    }

    fn label(self) -> &'static str {
        match self {
            Self::Succeeded => "Success",
            Self::Failed => "Failed",
            Self::Skipped => "Skipped",
        }
    }
}

/// What happened during one cycle. Logged, never stored.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Collection timestamp stamped on every record; `None` if extraction failed.
    pub collected_at: Option<NaiveDateTime>,
    pub extraction: StageOutcome,
    pub document_load: StageOutcome,
    pub tabular_load: StageOutcome,
    /// Records in the extracted payload.
    pub records: usize,
}

impl PipelineRun {
    fn start() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            collected_at: None,
            extraction: StageOutcome::Skipped,
            document_load: StageOutcome::Skipped,
            tabular_load: StageOutcome::Skipped,
            records: 0,
        }
    }

    /// The cycle counts as a success only when both loads landed.
    pub fn succeeded(&self) -> bool {
        self.document_load.is_success() && self.tabular_load.is_success()
    }

    fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        enter(CycleState::Done);
        info!(
            records = self.records,
            elapsed_ms = (self.finished_at - self.started_at).num_milliseconds(),
            "Pipeline run finished. JSON load: {}, tabular load: {}",
            self.document_load.label(),
            self.tabular_load.label()
        );
        info!("{BANNER}");
        self
    }
}

fn enter(state: CycleState) {
    debug!(?state, "Cycle state");
}

/// Clears the in-flight flag when the cycle ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The wired-up extract → transform → load job.
pub struct Pipeline<P> {
    extractor: Extractor<P>,
    snapshots: SnapshotStore,
    store: MarketStore,
    in_flight: AtomicBool,
}

impl<P: MarketDataProvider> Pipeline<P> {
    pub fn new(extractor: Extractor<P>, snapshots: SnapshotStore, store: MarketStore) -> Self {
        Self {
            extractor,
            snapshots,
            store,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Whether a cycle is currently executing.
    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run one full cycle.
    ///
    /// Returns `None` without doing anything when another cycle is still in flight.
    pub async fn run_cycle(&self) -> Option<PipelineRun> {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            warn!("Previous pipeline run still in progress; skipping this one");
            return None;
        };
        Some(self.cycle().await)
    }

    async fn cycle(&self) -> PipelineRun {
        info!("{BANNER}");
        info!("Starting scheduled pipeline run");
        let mut run = PipelineRun::start();

        enter(CycleState::Extracting);
        let snapshot = match self.extractor.extract().await {
            Ok(snapshot) if !snapshot.is_empty() => snapshot,
            Ok(_) => {
                error!("Extraction returned no data; skipping transform/load");
                run.extraction = StageOutcome::Failed;
                return run.finish();
            }
            Err(_) => {
                error!("Extraction failed; skipping transform/load");
                run.extraction = StageOutcome::Failed;
                return run.finish();
            }
        };
        run.extraction = StageOutcome::Succeeded;
        run.records = snapshot.record_count();

        enter(CycleState::Transforming);
        let collected_at = collection_timestamp(Utc::now());
        run.collected_at = Some(collected_at);

        let documents = transform::to_document(&snapshot.payload, collected_at, &self.snapshots)
            .inspect_err(|e| error!(error = %e, "JSON transform failed"))
            .ok();
        let rows = transform::to_tabular(&snapshot.payload, collected_at)
            .inspect_err(|e| error!(error = %e, "Tabular transform failed"))
            .ok();

        enter(CycleState::Loading);
        if let Some(documents) = documents {
            run.document_load = StageOutcome::from_ok(self.load_documents(documents).await);
        }
        if let Some(rows) = rows {
            run.tabular_load = StageOutcome::from_ok(self.load_rows(rows).await);
        }

        run.finish()
    }

    async fn load_documents(&self, documents: Vec<MarketRecordDocument>) -> bool {
        let store = self.store.clone();
        join_load(tokio::task::spawn_blocking(move || store.load_document(&documents))).await
    }

    async fn load_rows(&self, rows: Vec<MarketRecordTabular>) -> bool {
        let store = self.store.clone();
        join_load(tokio::task::spawn_blocking(move || store.load_tabular(&rows))).await
    }
}

async fn join_load(task: tokio::task::JoinHandle<bool>) -> bool {
    match task.await {
        Ok(ok) => ok,
        Err(e) => {
            error!(error = %e, "Load task did not complete");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_needs_both_loads() {
        let mut run = PipelineRun::start();
        assert!(!run.succeeded());

        run.document_load = StageOutcome::Succeeded;
        run.tabular_load = StageOutcome::Failed;
        assert!(!run.succeeded());

        run.tabular_load = StageOutcome::Succeeded;
        assert!(run.succeeded());
    }

    #[test]
    fn in_flight_guard_is_exclusive_and_released_on_drop() {
        let flag = AtomicBool::new(false);

        let guard = InFlight::acquire(&flag).expect("first acquire");
        assert!(InFlight::acquire(&flag).is_none());
        drop(guard);

        assert!(!flag.load(Ordering::Acquire));
        assert!(InFlight::acquire(&flag).is_some());
    }
}
