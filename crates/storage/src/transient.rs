// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transient state handed off across a seamless upgrade: the DNS snoop
//! cache, current dynamic ipset membership, and the HA state version.
//! None of this is config; it is in-memory working state the old process
//! would otherwise lose at exit.
//!
//! A `{ version, data: Value }` provenance wrapper keeps storage agnostic
//! to the concrete shape of each subsystem's payload, so `ward-engine`'s
//! DNS Wall and HA service can evolve their own record types without this
//! crate depending on them.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// A versioned, opaquely-typed payload handed off between old and new
/// process. `version` lets the new process (which may be a different
/// build) detect a shape it no longer understands and fall back to a
/// cold start for that piece of state rather than misinterpret it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransientRecord {
    pub version: u32,
    pub data: serde_json::Value,
}

impl TransientRecord {
    pub fn new(version: u32, data: serde_json::Value) -> Self {
        Self { version, data }
    }
}

/// Key under which the DNS snoop cache is handed off.
pub const DNS_CACHE_KEY: &str = "dns_cache";
/// Key under which current dynamic ipset membership is handed off.
pub const IPSET_MEMBERSHIP_KEY: &str = "ipset_membership";
/// Key under which the HA state machine's version counter is handed off.
pub const HA_STATE_KEY: &str = "ha_state";

/// Durable store for upgrade-handoff records, rooted at
/// `$state_dir/transient/`.
pub struct TransientStore {
    dir: PathBuf,
}

impl TransientStore {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self { dir: state_dir.into().join("transient") }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json.zst"))
    }

    fn io_err(&self, path: &std::path::Path, source: std::io::Error) -> StorageError {
        StorageError::Io { path: path.display().to_string(), source }
    }

    pub fn save(&self, key: &str, record: &TransientRecord) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|e| self.io_err(&self.dir, e))?;
        let path = self.path_for(key);
        let json = serde_json::to_vec(record)
            .map_err(|e| StorageError::Serde { path: path.display().to_string(), source: e })?;
        let compressed = zstd::encode_all(json.as_slice(), 0).map_err(|e| self.io_err(&path, e))?;
        fs::write(&path, compressed).map_err(|e| self.io_err(&path, e))
    }

    /// Returns `None` when no handoff record exists for `key` — the
    /// expected outcome on a fresh boot, not an error.
    pub fn load(&self, key: &str) -> Result<Option<TransientRecord>, StorageError> {
        let path = self.path_for(key);
        let compressed = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_err(&path, e)),
        };
        let json = zstd::decode_all(compressed.as_slice())
            .map_err(|e| StorageError::Decompress { path: path.display().to_string(), source: e })?;
        let record = serde_json::from_slice(&json)
            .map_err(|e| StorageError::Serde { path: path.display().to_string(), source: e })?;
        Ok(Some(record))
    }

    /// Removes a handoff record once the new process has consumed it, so
    /// a later cold restart does not resurrect stale state.
    pub fn clear(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_err(&path, e)),
        }
    }

    /// Consumes a record: loads it and clears it from disk in one step,
    /// matching the handoff's one-shot semantics (the new process is the
    /// sole reader).
    pub fn take(&self, key: &str) -> Result<Option<TransientRecord>, StorageError> {
        let record = self.load(key)?;
        if record.is_some() {
            self.clear(key)?;
        }
        Ok(record)
    }
}

#[cfg(test)]
#[path = "transient_tests.rs"]
mod tests;
