//! SQLite connection helpers.
//!
//! [`connect_sqlite`] opens a connection and applies the connection-wide PRAGMAs the
//! loader relies on: WAL journaling and a 5000ms busy_timeout.
//!
//! Example:
//! ```no_run
//! use market_store::db::connection::connect_sqlite;
//!
//! let path = std::env::temp_dir().join("market_store_example.db");
//! let _conn = connect_sqlite(path.to_str().unwrap()).expect("open sqlite");
//! ```

use anyhow::Context;
use diesel::{Connection, RunQueryDsl, SqliteConnection, sql_query};

/// Strip an optional `sqlite://` / `sqlite:` scheme so both URL-style and bare-path
/// connection strings name the same file.
pub fn sqlite_path(database_url: &str) -> &str {
    database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url)
}

/// Open a SQLite connection and apply connection-wide PRAGMAs.
pub fn connect_sqlite(database_url: &str) -> anyhow::Result<SqliteConnection> {
    let path = sqlite_path(database_url);
    let mut conn = SqliteConnection::establish(path)
        .with_context(|| format!("failed to open sqlite database at {path}"))?;

    // Readers never block the hourly writer; a second writer waits instead of failing.
    sql_query("PRAGMA journal_mode=WAL;").execute(&mut conn)?;
    sql_query("PRAGMA busy_timeout=5000;").execute(&mut conn)?;
    Ok(conn)
}
