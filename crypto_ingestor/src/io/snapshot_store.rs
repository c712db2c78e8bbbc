//! Append-only JSON snapshot log on the local file system.
//!
//! Two streams live side by side:
//! - raw responses: `<raw_dir>/crypto_<YYYYMMDD_HHMMSS>.json`
//! - processed documents: `<processed_dir>/crypto_transformed_<YYYYMMDD_HHMMSS>.json`
//!
//! Files are pretty-printed with a four-space indent and never overwritten: when a
//! key is already taken (two captures within the same second) a `_<n>` suffix is
//! appended.

use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use thiserror::Error;

use crate::models::snapshot::snapshot_key;

const RAW_PREFIX: &str = "crypto";
const PROCESSED_PREFIX: &str = "crypto_transformed";
const MAX_SUFFIX: u32 = 1000;

/// Errors raised while persisting a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to create snapshot directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write snapshot {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialise snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("no free file name for snapshot key {key} in {dir}")]
    KeyExhausted { key: String, dir: PathBuf },
}

/// Where raw and processed snapshots are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotStore {
    raw_dir: PathBuf,
    processed_dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(raw_dir: impl Into<PathBuf>, processed_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
            processed_dir: processed_dir.into(),
        }
    }

    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }

    pub fn processed_dir(&self) -> &Path {
        &self.processed_dir
    }

    /// Create both directories if they do not exist yet.
    pub fn ensure_dirs(&self) -> Result<(), SnapshotError> {
        create_dir(&self.raw_dir)?;
        create_dir(&self.processed_dir)
    }

    /// Persist a raw API response captured at `captured_at`.
    pub fn write_raw<T: Serialize + ?Sized>(
        &self,
        payload: &T,
        captured_at: NaiveDateTime,
    ) -> Result<PathBuf, SnapshotError> {
        let key = snapshot_key(RAW_PREFIX, captured_at);
        write_json(&self.raw_dir, &key, payload)
    }

    /// Persist the processed document list of the cycle collected at `collected_at`.
    pub fn write_processed<T: Serialize>(
        &self,
        records: &[T],
        collected_at: NaiveDateTime,
    ) -> Result<PathBuf, SnapshotError> {
        let key = snapshot_key(PROCESSED_PREFIX, collected_at);
        write_json(&self.processed_dir, &key, records)
    }
}

/// Render `value` as JSON indented with four spaces.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser)?;
    Ok(buf)
}

fn create_dir(path: &Path) -> Result<(), SnapshotError> {
    fs::create_dir_all(path).map_err(|source| SnapshotError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize + ?Sized>(
    dir: &Path,
    key: &str,
    value: &T,
) -> Result<PathBuf, SnapshotError> {
    let bytes = to_pretty_json(value)?;
    create_dir(dir)?;

    let (mut file, path) = create_unique(dir, key)?;
    file.write_all(&bytes)
        .and_then(|_| file.sync_all())
        .map_err(|source| SnapshotError::Write {
            path: path.clone(),
            source,
        })?;

    Ok(path)
}

fn create_unique(dir: &Path, key: &str) -> Result<(File, PathBuf), SnapshotError> {
    for n in 0..MAX_SUFFIX {
        let name = if n == 0 {
            format!("{key}.json")
        } else {
            format!("{key}_{n}.json")
        };
        let path = dir.join(name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((file, path)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(source) => return Err(SnapshotError::Write { path, source }),
        }
    }

    Err(SnapshotError::KeyExhausted {
        key: key.to_string(),
        dir: dir.to_path_buf(),
    })
}
