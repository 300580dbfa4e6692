// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only control-plane operations.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Query {
    GetStatus,
    /// `staged = true` reads the staged document; `false` reads running.
    GetConfig { staged: bool },
    GetConfigSection { path: String, staged: bool },
    BackupList,
    ListIpSet { set: String },
    CheckIpSet { set: String, ip: IpAddr },
    SystemStats,
    SystemRoutes,
    Ping,

    /// Learning-mode rule review, uplink status, flow moderation queue,
    /// analytics reads, DNS history/stats, alert state, network scan
    /// results, device identity lookups: the read-side counterpart of
    /// [`crate::Request::CollaboratorCommand`].
    CollaboratorQuery { method: String, params: serde_json::Value },
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
