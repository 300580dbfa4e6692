// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mutating control-plane operations. Named collaborators whose internals
//! are out of scope (learning mode, uplink management, flow moderation,
//! alerting, network scan, WoL, device identity) carry an opaque
//! `serde_json::Value` payload — the RPC surface exists, the subsystem
//! behind it does not.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use ward_core::{Bond, Interface, Vlan};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Replace the staged document wholesale with raw HCL text.
    SetConfig { hcl: String },
    /// Replace one top-level section (e.g. `"dns"`, `"interface.eth0"`) of
    /// the staged document with raw HCL text.
    SetConfigSection { path: String, hcl: String },
    Apply,
    Discard,
    Rollback { generation: Option<u64> },
    /// Confirm a safe-apply window before its automatic revert deadline.
    SafeApplyConfirm,
    SafeApplyCancel,
    RestartService { name: String },

    AddInterface { interface: Interface },
    UpdateInterface { name: String, interface: Interface },
    RemoveInterface { name: String },
    AddVlan { interface: String, vlan: Vlan },
    RemoveVlan { interface: String, vlan_id: u16 },
    SetBond { interface: String, bond: Bond },
    RemoveBond { interface: String },

    BackupCreate { comment: Option<String> },
    BackupRestore { id: String },
    BackupPin { id: String, pinned: bool },

    AuthorizeIp { set: String, ip: IpAddr, ttl_secs: Option<u32> },
    RevokeIp { set: String, ip: IpAddr },

    Upgrade { expected_checksum: String },

    SystemReboot,
    SafeModeEnter,
    SafeModeExit,
    Ping,

    /// Learning-mode rule moderation, uplink management, flow moderation,
    /// alerting configuration, network scan triggers, Wake-on-LAN, device
    /// identity edits: method names for collaborators whose internals this
    /// implementation does not own.
    CollaboratorCommand { method: String, params: serde_json::Value },
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
