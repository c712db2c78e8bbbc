use anyhow::{Context, Result};
use crypto_ingestor::{Extractor, providers::coingecko::CoinGeckoProvider};
use crypto_pipeline::{Pipeline, PipelineConfig, Scheduler};
use market_store::MarketStore;
use shared_utils::logging::init_logging;
use tokio::sync::oneshot;
use tracing::{info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // A missing .env is fine; everything has a default.
    let _ = dotenvy::dotenv();

    let mut config = PipelineConfig::load().context("failed to load configuration")?;

    let snapshots = config.snapshot_store();
    snapshots
        .ensure_dirs()
        .context("failed to create snapshot directories")?;
    init_logging(&config.log_config()).context("failed to initialise logging")?;

    let provider =
        CoinGeckoProvider::new(config.coingecko()).context("failed to build CoinGecko client")?;
    let extractor = Extractor::new(provider, config.api.params.clone(), snapshots.clone());
    let store = MarketStore::new(config.storage.database_url.clone());
    let pipeline = Pipeline::new(extractor, snapshots, store);

    let shutdown = listen_for_shutdown();
    let mut scheduler = Scheduler::new(config.interval(), config.poll_interval());
    info!(
        interval_secs = config.schedule.interval_secs,
        database = %config.storage.database_url,
        "Starting scheduled pipeline. First job will run at the scheduled time."
    );

    if config.schedule.run_on_start {
        pipeline.run_cycle().await;
    }

    scheduler
        .run(|| pipeline.run_cycle(), async {
            let _ = shutdown.await;
        })
        .await;

    info!("Pipeline stopped");
    Ok(())
}

/// Resolves once Ctrl+C is pressed. Installed up front so a signal during the first
/// cycle still ends the loop cleanly afterwards.
fn listen_for_shutdown() -> oneshot::Receiver<()> {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C; stopping after the current cycle");
                let _ = tx.send(());
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for Ctrl+C; running until killed");
                // Keep the sender alive so the scheduler never sees a shutdown.
                let _tx = tx;
                std::future::pending::<()>().await;
            }
        }
    });
    rx
}
