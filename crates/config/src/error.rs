// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loader error taxonomy: the closed set of ways a configuration document
//! can fail to load.

use thiserror::Error;
use ward_core::WardError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("syntax error in {path}: {message}")]
    SyntaxError { path: String, message: String },

    #[error("{path}: unknown reference {reference:?}")]
    ReferenceError { path: String, reference: String },

    #[error("{path}: {message}")]
    RangeError { path: String, message: String },

    #[error("{path}: schema_version {found} is newer than the supported {supported}")]
    SchemaMismatch { path: String, found: u32, supported: u32 },
}

impl From<LoadError> for WardError {
    fn from(err: LoadError) -> Self {
        WardError::StateInconsistent(err.to_string())
    }
}

/// A non-fatal problem surfaced while loading, not severe enough to abort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub path: String,
    pub message: String,
}

impl Warning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { path: path.into(), message: message.into() }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A `ReferenceError`/`RangeError` that [`forgiving_load`](crate::loader::forgiving_load)
/// caught at the per-field level and replaced with a documented default
/// rather than aborting the whole load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredError {
    pub path: String,
    pub message: String,
    pub substituted_default: String,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
