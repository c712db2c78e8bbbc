//! Database utilities.
//!
//! - SQLite connection helper: [`connection::connect_sqlite`] applies WAL and a 5000ms
//!   busy_timeout, accepting either a bare path or a `sqlite://` URL.
//! - MySQL reachability check: [`probe::probe`] backs the `db-check` binary.

pub mod connection;
pub mod probe;
