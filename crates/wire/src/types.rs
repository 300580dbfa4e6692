// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Small value types shared between [`crate::Request`]/[`crate::Query`] and
//! [`crate::Response`] payloads.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub generation: u64,
    pub uptime_secs: u64,
    /// `"disabled"`, `"primary"`, `"backup"`, or `"taking_over"` — the HA
    /// Service owns the richer state machine, this is just its label.
    pub ha_role: String,
    pub safe_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupSummary {
    pub id: String,
    pub created_at: jiff::Timestamp,
    pub comment: Option<String>,
    pub pinned: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStats {
    pub uptime_secs: u64,
    pub load_avg_1m: f64,
    pub load_avg_5m: f64,
    pub load_avg_15m: f64,
    pub mem_used_bytes: u64,
    pub mem_total_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub destination: String,
    pub gateway: Option<IpAddr>,
    pub interface: String,
    pub metric: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpSetEntry {
    pub address: IpAddr,
    /// Seconds remaining before expiry; `None` for statically configured members.
    pub expires_in_secs: Option<u64>,
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
