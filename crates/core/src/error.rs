// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The closed top-level error taxonomy.
//!
//! Every subsystem (`ward-config`, `ward-adapters`, `ward-engine`, ...)
//! defines its own `thiserror`-derived error enum and implements
//! `From<SubsystemError> for WardError` in its own crate (the orphan rule
//! permits this because the subsystem error type is local there). A
//! [`WardError`] is what crosses the control-plane RPC boundary: a single
//! closed taxonomy a client can match on regardless of which subsystem
//! raised it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed set of error kinds a `wardd` operation can surface to a
/// control-plane client.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message")]
pub enum WardError {
    #[error("kernel apply failed: {0}")]
    KernelApplyFailed(String),

    #[error("running state is inconsistent with the kernel: {0}")]
    StateInconsistent(String),

    #[error("operation timed out: {0}")]
    Timeout(String),

    #[error("operation canceled")]
    Canceled,

    #[error("peer unavailable: {0}")]
    PeerUnavailable(String),

    #[error("split-brain detected: {0}")]
    SplitBrain(String),

    #[error("takeover failed: {0}")]
    TakeoverFailed(String),

    #[error("upgrade failed: {0}")]
    UpgradeFailed(String),

    #[error("checksum mismatch: {0}")]
    ChecksumMismatch(String),

    #[error("authorization denied: {0}")]
    AuthorizationDenied(String),
}

impl WardError {
    /// The stable short name used in wire responses and logs, independent of
    /// the human-readable message carried in the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            WardError::KernelApplyFailed(_) => "kernel_apply_failed",
            WardError::StateInconsistent(_) => "state_inconsistent",
            WardError::Timeout(_) => "timeout",
            WardError::Canceled => "canceled",
            WardError::PeerUnavailable(_) => "peer_unavailable",
            WardError::SplitBrain(_) => "split_brain",
            WardError::TakeoverFailed(_) => "takeover_failed",
            WardError::UpgradeFailed(_) => "upgrade_failed",
            WardError::ChecksumMismatch(_) => "checksum_mismatch",
            WardError::AuthorizationDenied(_) => "authorization_denied",
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
