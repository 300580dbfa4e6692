// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Config backups: a timestamped, zstd-compressed copy of a fully
//! resolved [`Config`] written to `$state_dir/backups/` on every
//! successful `Apply` (when backup-on-apply is enabled) and on demand
//! via the control socket's `backup create` method.
//!
//! One file per checkpoint, named by id, loaded back in full rather than
//! replayed incrementally. This crate has no event-sourced log to
//! checkpoint against, so a backup is the unit of durability rather than
//! a WAL compaction point.

use std::fs;
use std::path::{Path, PathBuf};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use ward_core::Config;

use crate::error::StorageError;

const BACKUP_ID_ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// A single backed-up configuration generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupRecord {
    pub id: String,
    pub created_at: Timestamp,
    pub comment: Option<String>,
    #[serde(default)]
    pub pinned: bool,
    pub config: Config,
}

impl BackupRecord {
    pub fn summary(&self) -> BackupSummary {
        BackupSummary {
            id: self.id.clone(),
            created_at: self.created_at,
            comment: self.comment.clone(),
            pinned: self.pinned,
        }
    }
}

/// The subset of a [`BackupRecord`] surfaced over the control socket;
/// mirrors `ward_wire::BackupSummary` field for field.
#[derive(Debug, Clone, PartialEq)]
pub struct BackupSummary {
    pub id: String,
    pub created_at: Timestamp,
    pub comment: Option<String>,
    pub pinned: bool,
}

/// Durable store for config backups rooted at `$state_dir/backups/`.
pub struct BackupStore {
    dir: PathBuf,
}

impl BackupStore {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self { dir: state_dir.into().join("backups") }
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json.zst"))
    }

    fn io_err(&self, path: &Path, source: std::io::Error) -> StorageError {
        StorageError::Io { path: path.display().to_string(), source }
    }

    /// Writes a new backup, generating a fresh id. `created_at` is
    /// supplied by the caller so the call stays pure and testable.
    pub fn create(
        &self,
        config: &Config,
        comment: Option<String>,
        created_at: Timestamp,
    ) -> Result<BackupRecord, StorageError> {
        fs::create_dir_all(&self.dir).map_err(|e| self.io_err(&self.dir, e))?;
        let id = format!("bkp_{}", nanoid::nanoid!(16, &BACKUP_ID_ALPHABET));
        let record = BackupRecord { id, created_at, comment, pinned: false, config: config.clone() };
        self.write(&record)?;
        Ok(record)
    }

    fn write(&self, record: &BackupRecord) -> Result<(), StorageError> {
        let path = self.path_for(&record.id);
        let json = serde_json::to_vec(record)
            .map_err(|e| StorageError::Serde { path: path.display().to_string(), source: e })?;
        let compressed = zstd::encode_all(json.as_slice(), 0)
            .map_err(|e| self.io_err(&path, e))?;
        fs::write(&path, compressed).map_err(|e| self.io_err(&path, e))
    }

    pub fn load(&self, id: &str) -> Result<BackupRecord, StorageError> {
        let path = self.path_for(id);
        let compressed = fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(id.to_string())
            } else {
                self.io_err(&path, e)
            }
        })?;
        let json = zstd::decode_all(compressed.as_slice())
            .map_err(|e| StorageError::Decompress { path: path.display().to_string(), source: e })?;
        serde_json::from_slice(&json)
            .map_err(|e| StorageError::Serde { path: path.display().to_string(), source: e })
    }

    /// Lists all backups, most recently created first.
    pub fn list(&self) -> Result<Vec<BackupSummary>, StorageError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut records = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(|e| self.io_err(&self.dir, e))? {
            let entry = entry.map_err(|e| self.io_err(&self.dir, e))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("zst") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some(id) = stem.strip_suffix(".json") else {
                continue;
            };
            records.push(self.load(id)?.summary());
        }
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    pub fn set_pinned(&self, id: &str, pinned: bool) -> Result<BackupRecord, StorageError> {
        let mut record = self.load(id)?;
        record.pinned = pinned;
        self.write(&record)?;
        Ok(record)
    }

    /// Restores a backup, returning its fully resolved [`Config`] for the
    /// caller to stage and apply.
    pub fn restore(&self, id: &str) -> Result<Config, StorageError> {
        Ok(self.load(id)?.config)
    }
}

#[cfg(test)]
#[path = "backup_tests.rs"]
mod tests;
