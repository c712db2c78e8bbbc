//! Load stage: append each shape of a cycle to its own table.
//!
//! The public `load_*` operations never fail loudly; they log and return `false`, so
//! one sink failing leaves the other untouched. The `write_*` variants expose the
//! underlying error for callers that want it.

use crypto_ingestor::models::{MarketRecordDocument, MarketRecordTabular};
use diesel::{RunQueryDsl, SqliteConnection, insert_into};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    columns::{MARKET_DATA, MARKET_DATA_JSON, TableSpec},
    db::connection::connect_sqlite,
    models::{NewMarketDocumentRow, NewMarketRow},
    schema::{market_data, market_data_json},
};

/// Why a batch did not make it into the database.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The database could not be opened.
    #[error("failed to open database: {0:#}")]
    Connect(#[from] anyhow::Error),
    /// DDL or insert failed; the batch was rolled back.
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    /// A document could not be rendered as JSON.
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Handle on the relational store, identified by its connection string.
///
/// A connection is opened per batch and dropped right after; nothing is held between
/// cycles.
#[derive(Debug, Clone)]
pub struct MarketStore {
    database_url: String,
}

impl MarketStore {
    /// Store backed by `database_url` (a SQLite path or `sqlite://` URL).
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    /// Connection string this store writes to.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Append tabular records to `market_data`. Returns whether the batch landed.
    pub fn load_tabular(&self, records: &[MarketRecordTabular]) -> bool {
        Self::report(&MARKET_DATA, records.len(), || self.write_tabular(records))
    }

    /// Append documents to `market_data_json`. Returns whether the batch landed.
    pub fn load_document(&self, records: &[MarketRecordDocument]) -> bool {
        Self::report(&MARKET_DATA_JSON, records.len(), || self.write_document(records))
    }

    /// Insert tabular records in one transaction, creating the table if needed.
    pub fn write_tabular(&self, records: &[MarketRecordTabular]) -> Result<usize, LoadError> {
        if records.is_empty() {
            return Ok(0);
        }
        let rows: Vec<NewMarketRow> = records.iter().map(NewMarketRow::from).collect();

        self.in_transaction(&MARKET_DATA, |conn| {
            insert_into(market_data::table).values(&rows).execute(conn)
        })
    }

    /// Insert documents in one transaction, creating the table if needed.
    pub fn write_document(&self, records: &[MarketRecordDocument]) -> Result<usize, LoadError> {
        if records.is_empty() {
            return Ok(0);
        }
        let rows = records
            .iter()
            .map(NewMarketDocumentRow::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        self.in_transaction(&MARKET_DATA_JSON, |conn| {
            insert_into(market_data_json::table)
                .values(&rows)
                .execute(conn)
        })
    }

    fn in_transaction<F>(&self, table: &TableSpec, insert: F) -> Result<usize, LoadError>
    where
        F: FnOnce(&mut SqliteConnection) -> diesel::QueryResult<usize>,
    {
        let mut conn = connect_sqlite(&self.database_url)?;
        let written = conn.immediate_transaction(|conn| {
            table.ensure(conn)?;
            insert(conn)
        })?;
        Ok(written)
    }

    fn report<F>(table: &TableSpec, len: usize, write: F) -> bool
    where
        F: FnOnce() -> Result<usize, LoadError>,
    {
        if len == 0 {
            warn!(table = table.name, "No records to load");
            return true;
        }
        match write() {
            Ok(rows) => {
                info!(table = table.name, rows, "Loaded rows into table");
                true
            }
            Err(e) => {
                error!(table = table.name, error = %e, "Load failed");
                false
            }
        }
    }
}
