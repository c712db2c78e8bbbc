#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use crypto_ingestor::models::{MarketRecordDocument, MarketRecordTabular};
use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Text};
use market_store::{MarketStore, db::connection};
use rust_decimal_macros::dec;
use serde_json::json;
use std::path::PathBuf;
use tempfile::TempDir;

#[derive(QueryableByName)]
struct JournalMode {
    #[diesel(sql_type = Text)]
    journal_mode: String,
}
#[derive(QueryableByName)]
struct BusyTimeout {
    #[diesel(sql_type = Integer, column_name = "timeout")]
    busy_timeout: i32,
}
#[derive(QueryableByName)]
struct Count {
    #[diesel(sql_type = BigInt)]
    n: i64,
}

#[derive(QueryableByName, Debug, PartialEq)]
pub struct ColumnInfo {
    #[diesel(sql_type = Text)]
    pub name: String,
    #[diesel(sql_type = Text, column_name = "type")]
    pub ty: String,
}

pub struct TestDb {
    _dir: TempDir,    // keep alive for the life of the test
    pub path: String, // <tmpdir>/crypto_data.db
}

impl TestDb {
    pub fn exists(&self) -> bool {
        PathBuf::from(&self.path).exists()
    }

    pub fn connect(&self) -> SqliteConnection {
        connection::connect_sqlite(&self.path).expect("connect")
    }
}

/// A fresh, not-yet-created database file and a store pointed at it.
pub fn setup_store() -> (TestDb, MarketStore) {
    let dir = TempDir::new().expect("tempdir");
    let mut p = PathBuf::from(dir.path());
    p.push("crypto_data.db");
    let path = p.to_string_lossy().to_string();

    let store = MarketStore::new(path.clone());
    (TestDb { _dir: dir, path }, store)
}

pub fn assert_sqlite_pragmas(conn: &mut SqliteConnection) {
    use diesel::sql_query;

    let jm: JournalMode = sql_query("PRAGMA journal_mode;").get_result(conn).unwrap();
    assert_eq!(jm.journal_mode.to_lowercase(), "wal"); // WAL is persistent per DB file

    let bt: BusyTimeout = sql_query("PRAGMA busy_timeout;").get_result(conn).unwrap();
    assert_eq!(bt.busy_timeout, 5000);
}

pub fn table_exists(conn: &mut SqliteConnection, table: &str) -> bool {
    let c: Count = diesel::sql_query(
        "SELECT COUNT(*) AS n FROM sqlite_master WHERE type = 'table' AND name = ?",
    )
    .bind::<Text, _>(table)
    .get_result(conn)
    .expect("sqlite_master");
    c.n == 1
}

pub fn columns(conn: &mut SqliteConnection, table: &str) -> Vec<ColumnInfo> {
    diesel::sql_query("SELECT name, type FROM pragma_table_info(?) ORDER BY cid")
        .bind::<Text, _>(table)
        .load(conn)
        .expect("table_info")
}

pub fn ts() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 4, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

pub fn bitcoin_row() -> MarketRecordTabular {
    MarketRecordTabular {
        id: "bitcoin".into(),
        symbol: "btc".into(),
        name: "Bitcoin".into(),
        current_price: Some(dec!(65000.12)),
        market_cap: Some(1_275_000_000_000),
        total_volume: Some(30_000_000_000),
        timestamp: ts(),
    }
}

pub fn bitcoin_document() -> MarketRecordDocument {
    MarketRecordDocument {
        id: json!("bitcoin"),
        symbol: json!("btc"),
        name: json!("Bitcoin"),
        current_price: json!(65000.12),
        market_cap: json!(1_275_000_000_000i64),
        total_volume: json!(30_000_000_000i64),
        timestamp: ts(),
    }
}
