// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Optional top-level config sections: DHCP, DNS, SSH, VPN, HA, Replication, VRF.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

/// `dhcp { ... }` block: server scopes keyed by interface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DhcpConfig {
    #[serde(default)]
    pub scopes: Vec<DhcpScope>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DhcpScope {
    pub interface: String,
    pub range_start: IpAddr,
    pub range_end: IpAddr,
    #[serde(default)]
    pub lease_seconds: Option<u32>,
}

/// `dns { ... }` block: resolver behavior and egress-wall binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsConfig {
    #[serde(default)]
    pub egress_filtering: bool,
    /// Name of the dynamic ipset the DNS Egress Authorizer authorizes into.
    #[serde(default = "default_egress_set")]
    pub egress_set: String,
    /// 0 means "use the record's own TTL".
    #[serde(default)]
    pub override_ttl_secs: u32,
}

fn default_egress_set() -> String {
    "dns-egress".to_string()
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self { egress_filtering: false, egress_set: default_egress_set(), override_ttl_secs: 0 }
    }
}

/// `ssh { ... }` block: lifecycle/reload contract only, server internals out of scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SshConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub port: Option<u16>,
}

/// `vpn { ... }` block: named only as a collaborator lifecycle surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VpnConfig {
    #[serde(default)]
    pub enabled: bool,
}

/// `replication { ... }` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplicationConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub peers: Vec<String>,
}

/// `vrf "<name>" { ... }` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VrfConfig {
    pub name: String,
    #[serde(default)]
    pub table_id: Option<u32>,
}

/// `mdns { ... }` block: lifecycle/reload contract only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MdnsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub bindings: Vec<String>,
}

/// HA operating mode, selects the initial state of the HA Service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HaMode {
    Disabled,
    Primary,
    Backup,
}

impl Default for HaMode {
    fn default() -> Self {
        HaMode::Disabled
    }
}

/// `ha { ... }` block: HA Service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HaConfig {
    #[serde(default)]
    pub mode: HaMode,
    pub node_id: String,
    #[serde(default)]
    pub peers: Vec<IpAddr>,
    #[serde(default = "default_heartbeat_port")]
    pub heartbeat_port: u16,
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval: Duration,
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    #[serde(default = "default_priority")]
    pub priority: u32,
    #[serde(default = "default_failback_delay")]
    pub failback_delay: Duration,
    #[serde(default)]
    pub shared_secret: Option<String>,
    #[serde(default)]
    pub virtual_resources: Vec<super::VirtualResource>,
}

fn default_heartbeat_port() -> u16 {
    9002
}
fn default_heartbeat_interval() -> Duration {
    Duration::from_secs(1)
}
fn default_failure_threshold() -> u32 {
    3
}
fn default_priority() -> u32 {
    100
}
fn default_failback_delay() -> Duration {
    Duration::from_secs(60)
}

impl HaConfig {
    pub fn disabled(node_id: impl Into<String>) -> Self {
        Self {
            mode: HaMode::Disabled,
            node_id: node_id.into(),
            peers: Vec::new(),
            heartbeat_port: default_heartbeat_port(),
            heartbeat_interval: default_heartbeat_interval(),
            failure_threshold: default_failure_threshold(),
            priority: default_priority(),
            failback_delay: default_failback_delay(),
            shared_secret: None,
            virtual_resources: Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "sections_tests.rs"]
mod tests;
