// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The capability trait the Config Manager drives on `Apply`/`Rollback`.
//!
//! Lives in `ward-core` rather than `ward-daemon` (which owns the Config
//! Manager that calls it) so that `ward-engine` (which implements it) does
//! not need to depend on `ward-daemon` — the trait sits at the bottom of
//! the dependency graph, consumed upward by both.

use crate::model::Config;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::WardError;

/// An apply-hook failure. Carries no structure beyond a message: the Config
/// Manager only needs to know whether to keep rolling back the remaining
/// hooks, not the specifics of what went wrong.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{0}")]
pub struct HookError(pub String);

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<HookError> for WardError {
    fn from(err: HookError) -> Self {
        WardError::StateInconsistent(err.0)
    }
}

/// One ordered participant in the Config Manager's apply pipeline.
///
/// Registration order at `wardd` startup is fixed (Network Reconciler, DNS
/// Wall, HA, eBPF bridge); `apply` runs in that order and `rollback` runs
/// in reverse on any failure, so a later hook can assume an earlier hook's
/// effects are already live.
#[async_trait]
pub trait ApplyHook: Send + Sync {
    fn name(&self) -> &'static str;
    async fn apply(&self, running: &Config, staged: &Config) -> Result<(), HookError>;
    async fn rollback(&self, running: &Config) -> Result<(), HookError>;
}
