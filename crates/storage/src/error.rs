// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage error taxonomy: filesystem and (de)serialization failures
//! reading or writing backups and transient state under `state_dir`.

use thiserror::Error;
use ward_core::WardError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error at {path}: {source}")]
    Io { path: String, #[source] source: std::io::Error },

    #[error("{path}: {source}")]
    Serde { path: String, #[source] source: serde_json::Error },

    #[error("{path}: corrupt zstd frame: {source}")]
    Decompress { path: String, #[source] source: std::io::Error },

    #[error("no backup with id {0:?}")]
    NotFound(String),
}

impl From<StorageError> for WardError {
    fn from(err: StorageError) -> Self {
        WardError::StateInconsistent(err.to_string())
    }
}
