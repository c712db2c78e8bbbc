//! MySQL reachability check.
//!
//! Connects with the given credentials, asks for the server version and makes sure
//! the target database exists. Used by the `db-check` binary before pointing the
//! pipeline at a MySQL server.

use secrecy::{ExposeSecret, SecretString};
use sqlx::{
    Connection,
    mysql::{MySqlConnectOptions, MySqlConnection},
};
use thiserror::Error;
use tracing::{debug, info};

/// Default MySQL host.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default MySQL port.
pub const DEFAULT_PORT: u16 = 3306;
/// Default database to create/verify.
pub const DEFAULT_DATABASE: &str = "crypto";

/// Connection parameters for [`probe`].
#[derive(Debug)]
pub struct ProbeConfig {
    /// Server host name or address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// User name; `None` connects with an empty user.
    pub user: Option<String>,
    /// Password; never printed.
    pub password: Option<SecretString>,
    /// Database to create if it does not exist.
    pub database: String,
}

impl ProbeConfig {
    /// The password as a run of `*`, one per character, or `None` when unset.
    pub fn masked_password(&self) -> Option<String> {
        self.password
            .as_ref()
            .map(|p| "*".repeat(p.expose_secret().chars().count()))
    }

    fn connect_options(&self) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(self.user.as_deref().unwrap_or_default());
        if let Some(password) = &self.password {
            options = options.password(password.expose_secret());
        }
        options
    }
}

/// What a successful probe learned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    /// Result of `SELECT VERSION()`.
    pub server_version: String,
    /// Database that now exists.
    pub database: String,
}

/// Which step of the probe failed.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// TCP connect or authentication failed.
    #[error("could not connect to {host}:{port}: {source}")]
    Connect {
        /// Host that was tried.
        host: String,
        /// Port that was tried.
        port: u16,
        /// Driver error.
        #[source]
        source: sqlx::Error,
    },
    /// `SELECT VERSION()` failed.
    #[error("version query failed: {0}")]
    Version(#[source] sqlx::Error),
    /// `CREATE DATABASE IF NOT EXISTS` failed.
    #[error("could not create database `{database}`: {source}")]
    CreateDatabase {
        /// Database that was requested.
        database: String,
        /// Driver error.
        #[source]
        source: sqlx::Error,
    },
}

/// `CREATE DATABASE IF NOT EXISTS` for `name`, quoted as a MySQL identifier.
pub fn create_database_sql(name: &str) -> String {
    format!("CREATE DATABASE IF NOT EXISTS `{}`", name.replace('`', "``"))
}

/// Connect, read the server version, then create the configured database.
pub async fn probe(config: &ProbeConfig) -> Result<ProbeReport, ProbeError> {
    debug!(host = %config.host, port = config.port, "Connecting to MySQL");
    let mut conn = MySqlConnection::connect_with(&config.connect_options())
        .await
        .map_err(|source| ProbeError::Connect {
            host: config.host.clone(),
            port: config.port,
            source,
        })?;

    let server_version: String = sqlx::query_scalar("SELECT VERSION()")
        .fetch_one(&mut conn)
        .await
        .map_err(ProbeError::Version)?;
    info!(version = %server_version, "MySQL connection established");

    sqlx::raw_sql(&create_database_sql(&config.database))
        .execute(&mut conn)
        .await
        .map_err(|source| ProbeError::CreateDatabase {
            database: config.database.clone(),
            source,
        })?;
    info!(database = %config.database, "Database created/verified");

    // Best effort; the server drops the session on disconnect anyway.
    let _ = conn.close().await;

    Ok(ProbeReport {
        server_version,
        database: config.database.clone(),
    })
}
