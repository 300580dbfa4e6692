// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Upgrade Manager, platform-independent half: the handoff protocol state
//! machine and checksum verification. The UNIX-socket FD-passing
//! transport and PID-file keeper that drive sockets and process lifecycle
//! live in `ward-daemon::upgrade`; this module only tracks where the
//! handoff is and persists/restores the transient state that must
//! survive the exec.
//!
//! Resources are staged in order and unwound in reverse on any step's
//! error, the same acquire/cleanup discipline process startup uses.

use std::path::Path;

use sha2::{Digest, Sha256};
use thiserror::Error;
use ward_core::WardError;
use ward_storage::{StorageError, TransientRecord, TransientStore, DNS_CACHE_KEY, HA_STATE_KEY, IPSET_MEMBERSHIP_KEY};

/// Current schema version stamped on every [`TransientRecord`] this
/// module writes; bumped whenever a payload's shape changes so a future
/// build can recognize state it no longer understands and fall back to
/// a cold start for that piece rather than misinterpret it.
pub const TRANSIENT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum UpgradeError {
    #[error("checksum mismatch: expected {expected}, computed {computed}")]
    ChecksumMismatch { expected: String, computed: String },

    #[error("cannot {action} from state {from:?}")]
    InvalidTransition { action: &'static str, from: UpgradeState },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("staged binary read failed: {0}")]
    Io(#[from] std::io::Error),
}

impl From<UpgradeError> for WardError {
    fn from(err: UpgradeError) -> Self {
        match &err {
            UpgradeError::ChecksumMismatch { .. } => WardError::ChecksumMismatch(err.to_string()),
            _ => WardError::UpgradeFailed(err.to_string()),
        }
    }
}

/// Progress through the seamless-upgrade handoff, one state per step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeState {
    Idle,
    Staged,
    StandbySpawned,
    StandbyReady,
    HandedOff,
    Failed,
}

/// A kind of resource the handoff transport can carry across the exec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandoffKind {
    Listener,
    PacketConn,
}

/// One named resource to hand off; unregistered names are created fresh
/// by the receiver rather than treated as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffEntry {
    pub kind: HandoffKind,
    pub name: String,
}

/// SHA-256 of a file on disk, hex-encoded lowercase.
fn sha256_hex(path: &Path) -> Result<String, UpgradeError> {
    let bytes = std::fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}

/// Verifies the staged binary's checksum against what the `Upgrade` RPC
/// carried, recomputing rather than trusting the caller's claim.
pub fn verify_checksum(staged_path: &Path, expected_hex: &str) -> Result<(), UpgradeError> {
    let computed = sha256_hex(staged_path)?;
    if computed.eq_ignore_ascii_case(expected_hex) {
        Ok(())
    } else {
        Err(UpgradeError::ChecksumMismatch { expected: expected_hex.to_string(), computed })
    }
}

/// Everything the old process must persist for the new process to pick
/// up cold state as if it had never restarted.
pub struct TransientHandoff {
    pub dns_cache: serde_json::Value,
    pub ipset_membership: serde_json::Value,
    pub ha_state_version: u64,
}

/// Tracks the handoff's progress and drives the one piece of it that
/// isn't FD-passing or process control: persisting/restoring the
/// transient-state records via [`TransientStore`].
pub struct UpgradeManager {
    state: UpgradeState,
    handoff_entries: Vec<HandoffEntry>,
    store: TransientStore,
}

impl UpgradeManager {
    pub fn new(store: TransientStore) -> Self {
        Self { state: UpgradeState::Idle, handoff_entries: Vec::new(), store }
    }

    pub fn state(&self) -> UpgradeState {
        self.state
    }

    /// Step 1: verify the staged binary's checksum and register it.
    pub fn stage(&mut self, staged_path: &Path, expected_checksum_hex: &str) -> Result<(), UpgradeError> {
        if self.state != UpgradeState::Idle {
            return Err(UpgradeError::InvalidTransition { action: "stage", from: self.state });
        }
        verify_checksum(staged_path, expected_checksum_hex)?;
        self.state = UpgradeState::Staged;
        Ok(())
    }

    /// Step 2: record which listeners/packet-conns will be handed off.
    /// Invoked once the old process has spawned the standby and sent it
    /// the FDs and key-name map over the UNIX socket (transport lives in
    /// `ward-daemon::upgrade`).
    pub fn mark_standby_spawned(&mut self, entries: Vec<HandoffEntry>) -> Result<(), UpgradeError> {
        if self.state != UpgradeState::Staged {
            return Err(UpgradeError::InvalidTransition { action: "mark_standby_spawned", from: self.state });
        }
        self.handoff_entries = entries;
        self.state = UpgradeState::StandbySpawned;
        Ok(())
    }

    /// Step 3: the standby signaled ready after loading and validating
    /// config.
    pub fn mark_standby_ready(&mut self) -> Result<(), UpgradeError> {
        if self.state != UpgradeState::StandbySpawned {
            return Err(UpgradeError::InvalidTransition { action: "mark_standby_ready", from: self.state });
        }
        self.state = UpgradeState::StandbyReady;
        Ok(())
    }

    /// Step 4: persist transient state so the standby can pick it up
    /// cold. The old process exits immediately after this succeeds.
    pub fn complete_handoff(&mut self, transient: &TransientHandoff) -> Result<(), UpgradeError> {
        if self.state != UpgradeState::StandbyReady {
            return Err(UpgradeError::InvalidTransition { action: "complete_handoff", from: self.state });
        }
        self.store.save(DNS_CACHE_KEY, &TransientRecord::new(TRANSIENT_SCHEMA_VERSION, transient.dns_cache.clone()))?;
        self.store.save(
            IPSET_MEMBERSHIP_KEY,
            &TransientRecord::new(TRANSIENT_SCHEMA_VERSION, transient.ipset_membership.clone()),
        )?;
        self.store.save(
            HA_STATE_KEY,
            &TransientRecord::new(TRANSIENT_SCHEMA_VERSION, serde_json::json!(transient.ha_state_version)),
        )?;
        self.state = UpgradeState::HandedOff;
        Ok(())
    }

    pub fn fail(&mut self) {
        self.state = UpgradeState::Failed;
    }

    pub fn handoff_entries(&self) -> &[HandoffEntry] {
        &self.handoff_entries
    }
}

/// Restores one transient-state record on the new process's cold start.
/// Returns `None` on a version this build no longer understands, so the
/// caller falls back to a cold start for that piece rather than
/// misinterpret the payload.
pub fn take_if_current_version(
    store: &TransientStore,
    key: &str,
) -> Result<Option<serde_json::Value>, UpgradeError> {
    let Some(record) = store.take(key)? else { return Ok(None) };
    if record.version != TRANSIENT_SCHEMA_VERSION {
        return Ok(None);
    }
    Ok(Some(record.data))
}

#[cfg(test)]
#[path = "upgrade_tests.rs"]
mod tests;
