use std::time::Duration;

use crypto_pipeline::StageOutcome;
use diesel::prelude::*;
use diesel::sql_query;
use market_store::models::{MarketDocumentRow, MarketRow};
use market_store::schema::{market_data, market_data_json};
use serde_json::{Value, json};

mod common;

use common::{StubProvider, Workspace, bitcoin, ethereum, files_in};

#[tokio::test]
async fn bitcoin_cycle_lands_in_both_tables_with_one_timestamp() {
    let ws = Workspace::new();
    let pipeline = ws.pipeline(StubProvider::payload(json!([bitcoin()])));

    let run = pipeline.run_cycle().await.expect("not in flight");

    assert!(run.succeeded());
    assert_eq!(run.extraction, StageOutcome::Succeeded);
    assert_eq!(run.records, 1);
    let collected_at = run.collected_at.expect("collected_at");

    assert_eq!(files_in(&ws.raw_dir()).len(), 1);
    assert_eq!(files_in(&ws.processed_dir()).len(), 1);

    let mut conn = ws.connect();
    let rows: Vec<MarketRow> = market_data::table
        .select(MarketRow::as_select())
        .load(&mut conn)
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, "bitcoin");
    assert_eq!(rows[0].market_cap, Some(1_275_000_000_000));
    assert_eq!(rows[0].timestamp, collected_at);

    let docs: Vec<MarketDocumentRow> = market_data_json::table
        .select(MarketDocumentRow::as_select())
        .load(&mut conn)
        .unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].collected_at, collected_at);

    let payload: Value = serde_json::from_str(&docs[0].payload).unwrap();
    assert_eq!(payload["symbol"], "btc");
    assert_eq!(
        payload["timestamp"],
        collected_at.format("%Y-%m-%d %H:%M:%S").to_string()
    );
    assert!(payload.get("image").is_none(), "only the six fields are kept");
}

#[tokio::test]
async fn http_500_fails_the_cycle_without_side_effects() {
    let ws = Workspace::new();
    let pipeline = ws.pipeline(StubProvider::status(500));

    let run = pipeline.run_cycle().await.expect("not in flight");

    assert!(!run.succeeded());
    assert_eq!(run.extraction, StageOutcome::Failed);
    assert_eq!(run.document_load, StageOutcome::Skipped);
    assert_eq!(run.tabular_load, StageOutcome::Skipped);
    assert!(run.collected_at.is_none());
    assert!(files_in(&ws.raw_dir()).is_empty());
    assert!(files_in(&ws.processed_dir()).is_empty());
    assert!(!ws.db_exists());
}

#[tokio::test]
async fn empty_payload_counts_as_no_data() {
    let ws = Workspace::new();
    let pipeline = ws.pipeline(StubProvider::payload(json!([])));

    let run = pipeline.run_cycle().await.expect("not in flight");

    assert!(!run.succeeded());
    assert_eq!(run.extraction, StageOutcome::Failed);
    // The response itself is still on disk.
    assert_eq!(files_in(&ws.raw_dir()).len(), 1);
    assert!(files_in(&ws.processed_dir()).is_empty());
    assert!(!ws.db_exists());
}

#[tokio::test]
async fn unparseable_price_is_null_and_cycle_succeeds() {
    let ws = Workspace::new();
    let pipeline = ws.pipeline(StubProvider::payload(json!([bitcoin(), ethereum()])));

    let run = pipeline.run_cycle().await.expect("not in flight");
    assert!(run.succeeded());

    let mut conn = ws.connect();
    let price: Option<String> = market_data::table
        .filter(market_data::id.eq("ethereum"))
        .select(market_data::current_price)
        .first(&mut conn)
        .unwrap();
    assert_eq!(price, None);
}

#[tokio::test]
async fn missing_tabular_key_skips_only_the_tabular_load() {
    let ws = Workspace::new();
    let mut partial = bitcoin();
    partial.as_object_mut().unwrap().remove("total_volume");
    let pipeline = ws.pipeline(StubProvider::payload(json!([partial])));

    let run = pipeline.run_cycle().await.expect("not in flight");

    assert!(!run.succeeded());
    assert_eq!(run.tabular_load, StageOutcome::Skipped);
    assert_eq!(run.document_load, StageOutcome::Succeeded);

    let mut conn = ws.connect();
    let docs: Vec<MarketDocumentRow> = market_data_json::table
        .select(MarketDocumentRow::as_select())
        .load(&mut conn)
        .unwrap();
    let payload: Value = serde_json::from_str(&docs[0].payload).unwrap();
    assert_eq!(payload["total_volume"], Value::Null);
}

#[tokio::test]
async fn incompatible_market_data_table_fails_only_tabular_load() {
    let ws = Workspace::new();
    {
        let mut conn = ws.connect();
        sql_query("CREATE TABLE market_data (legacy_key TEXT NOT NULL)")
            .execute(&mut conn)
            .unwrap();
    }
    let pipeline = ws.pipeline(StubProvider::payload(json!([bitcoin()])));

    let run = pipeline.run_cycle().await.expect("not in flight");

    assert!(!run.succeeded());
    assert_eq!(run.tabular_load, StageOutcome::Failed);
    assert_eq!(run.document_load, StageOutcome::Succeeded);

    let mut conn = ws.connect();
    let docs: i64 = market_data_json::table.count().get_result(&mut conn).unwrap();
    assert_eq!(docs, 1);
}

#[tokio::test]
async fn overlapping_cycle_is_rejected() {
    let ws = Workspace::new();
    let pipeline = ws.pipeline(
        StubProvider::payload(json!([bitcoin()])).with_delay(Duration::from_millis(50)),
    );

    let (first, second) = tokio::join!(pipeline.run_cycle(), pipeline.run_cycle());

    assert!(first.expect("first cycle runs").succeeded());
    assert!(second.is_none());
    assert!(!pipeline.is_running());
    assert_eq!(files_in(&ws.raw_dir()).len(), 1);
}

#[tokio::test]
async fn consecutive_cycles_append() {
    let ws = Workspace::new();
    let pipeline = ws.pipeline(StubProvider::payload(json!([bitcoin(), ethereum()])));

    assert!(pipeline.run_cycle().await.unwrap().succeeded());
    assert!(pipeline.run_cycle().await.unwrap().succeeded());

    let mut conn = ws.connect();
    let rows: i64 = market_data::table.count().get_result(&mut conn).unwrap();
    let docs: i64 = market_data_json::table.count().get_result(&mut conn).unwrap();
    assert_eq!(rows, 4);
    assert_eq!(docs, 4);
    assert_eq!(files_in(&ws.raw_dir()).len(), 2);
    assert_eq!(files_in(&ws.processed_dir()).len(), 2);
}
