#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use crypto_ingestor::{
    Extractor,
    io::SnapshotStore,
    models::MarketsRequestParams,
    providers::{MarketDataProvider, ProviderError, StatusSnafu},
};
use crypto_pipeline::Pipeline;
use diesel::SqliteConnection;
use market_store::{MarketStore, db::connection::connect_sqlite};
use serde_json::{Value, json};
use tempfile::TempDir;

pub enum Reply {
    Payload(Value),
    Status(u16),
}

/// Canned provider: answers every call the same way, optionally after a delay.
pub struct StubProvider {
    reply: Reply,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StubProvider {
    pub fn payload(v: Value) -> Self {
        Self {
            reply: Reply::Payload(v),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn status(code: u16) -> Self {
        Self {
            reply: Reply::Status(code),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl MarketDataProvider for StubProvider {
    async fn fetch_markets(&self, _params: &MarketsRequestParams) -> Result<Value, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.reply {
            Reply::Payload(v) => Ok(v.clone()),
            Reply::Status(code) => StatusSnafu {
                status: *code,
                body: r#"{"error":"internal"}"#,
            }
            .fail(),
        }
    }
}

/// Temp working directory laid out like a deployment.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("tempdir"),
        }
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.dir.path().join("raw_data")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.dir.path().join("processed_data")
    }

    pub fn db_path(&self) -> String {
        self.dir
            .path()
            .join("crypto_data.db")
            .to_string_lossy()
            .into_owned()
    }

    pub fn db_exists(&self) -> bool {
        Path::new(&self.db_path()).exists()
    }

    pub fn connect(&self) -> SqliteConnection {
        connect_sqlite(&self.db_path()).expect("connect")
    }

    pub fn pipeline(&self, provider: StubProvider) -> Pipeline<StubProvider> {
        let snapshots = SnapshotStore::new(self.raw_dir(), self.processed_dir());
        snapshots.ensure_dirs().expect("snapshot dirs");
        let extractor = Extractor::new(provider, MarketsRequestParams::default(), snapshots.clone());
        Pipeline::new(extractor, snapshots, MarketStore::new(self.db_path()))
    }
}

pub fn files_in(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map(|entries| entries.map(|e| e.unwrap().path()).collect())
        .unwrap_or_default();
    files.sort();
    files
}

pub fn bitcoin() -> Value {
    json!({
        "id": "bitcoin",
        "symbol": "btc",
        "name": "Bitcoin",
        "image": "https://assets.coingecko.com/coins/images/1/large/bitcoin.png",
        "current_price": 65000.12,
        "market_cap": 1275000000000i64,
        "market_cap_rank": 1,
        "total_volume": 30000000000i64,
        "price_change_percentage_24h": -1.25
    })
}

pub fn ethereum() -> Value {
    json!({
        "id": "ethereum",
        "symbol": "eth",
        "name": "Ethereum",
        "current_price": "N/A",
        "market_cap": 420000000000i64,
        "total_volume": 15000000000i64
    })
}
