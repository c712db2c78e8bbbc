//! Pipeline configuration.
//!
//! Resolution order, later wins:
//! 1. built-in defaults (top 10 by market cap in USD, hourly, `crypto_data.db`);
//! 2. a TOML file, `crypto_pipeline.toml` in the working directory or the path named
//!    by `CRYPTO_PIPELINE_CONFIG`;
//! 3. environment overrides (`DATABASE_URL`, `COINGECKO_BASE_URL`,
//!    `COINGECKO_API_KEY`, `CRYPTO_PIPELINE_INTERVAL_SECS`).
//!
//! ```toml
//! [api]
//! base_url = "https://api.coingecko.com/api/v3"
//! vs_currency = "usd"
//! per_page = 10
//!
//! [storage]
//! database_url = "crypto_data.db"
//!
//! [schedule]
//! interval_secs = 3600
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use crypto_ingestor::{
    io::SnapshotStore,
    models::MarketsRequestParams,
    providers::coingecko::{CoinGeckoConfig, DEFAULT_BASE_URL},
};
use secrecy::SecretString;
use serde::Deserialize;
use shared_utils::{
    env::{InvalidEnvVarError, get_env_var_opt, parse_env_var},
    logging::LogConfig,
};
use thiserror::Error;

/// Env var naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "CRYPTO_PIPELINE_CONFIG";
/// Config file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "crypto_pipeline.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Env(#[from] InvalidEnvVarError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub schedule: ScheduleConfig,
    pub logging: LoggingConfig,
}

/// Market-data source settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Query parameters of the listing request (`vs_currency`, `order`, `per_page`, ...).
    #[serde(flatten)]
    pub params: MarketsRequestParams,
    /// Demo-plan key. Only ever taken from the environment.
    #[serde(skip)]
    pub api_key: Option<SecretString>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            params: MarketsRequestParams::default(),
            api_key: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite path or `sqlite://` URL.
    pub database_url: String,
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: "crypto_data.db".to_string(),
            raw_dir: PathBuf::from("raw_data"),
            processed_dir: PathBuf::from("processed_data"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub interval_secs: u64,
    pub poll_interval_ms: u64,
    /// Run one cycle immediately instead of waiting a full interval.
    pub run_on_start: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3600,
            poll_interval_ms: 1000,
            run_on_start: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level used when `RUST_LOG` is unset.
    pub level: String,
    pub dir: PathBuf,
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: PathBuf::from("logs"),
            file: "pipeline.log".to_string(),
        }
    }
}

impl FromStr for PipelineConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

impl PipelineConfig {
    /// Parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        content.parse()
    }

    /// Defaults, then the config file (if any), then env overrides; validated.
    ///
    /// A path given through `CRYPTO_PIPELINE_CONFIG` must exist; the default file is
    /// optional.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match get_env_var_opt(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides in place.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(url) = get_env_var_opt("DATABASE_URL") {
            self.storage.database_url = url;
        }
        if let Some(url) = get_env_var_opt("COINGECKO_BASE_URL") {
            self.api.base_url = url;
        }
        if let Some(key) = get_env_var_opt("COINGECKO_API_KEY") {
            self.api.api_key = Some(SecretString::from(key));
        }
        if let Some(secs) = parse_env_var::<u64>("CRYPTO_PIPELINE_INTERVAL_SECS")? {
            self.schedule.interval_secs = secs;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api.params.validate().map_err(ConfigError::Invalid)?;
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.base_url must not be empty".into()));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid("api.timeout_secs must be > 0".into()));
        }
        if self.schedule.interval_secs == 0 {
            return Err(ConfigError::Invalid("schedule.interval_secs must be > 0".into()));
        }
        if self.schedule.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "schedule.poll_interval_ms must be > 0".into(),
            ));
        }
        if self.storage.database_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "storage.database_url must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Client settings for the CoinGecko provider. Moves the API key out.
    pub fn coingecko(&mut self) -> CoinGeckoConfig {
        CoinGeckoConfig {
            base_url: self.api.base_url.clone(),
            timeout: Duration::from_secs(self.api.timeout_secs),
            api_key: self.api.api_key.take(),
        }
    }

    pub fn snapshot_store(&self) -> SnapshotStore {
        SnapshotStore::new(&self.storage.raw_dir, &self.storage.processed_dir)
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig::default()
            .with_level(&self.logging.level)
            .with_file(&self.logging.dir, &self.logging.file)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.schedule.interval_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.schedule.poll_interval_ms)
    }
}
