// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `serde::Deserialize` mirror of the HCL block grammar, fed directly to
//! `hcl::from_str`. Labeled blocks deserialize by matching their labels, in
//! order, against a struct's leading fields; everything after comes from
//! the block body. An `extra` catch-all on each block preserves
//! unrecognized attributes so the loader can turn them into warnings
//! instead of a hard parse failure.

use ipnet::{IpNet, Ipv4Net};
use serde::Deserialize;
use std::collections::HashMap;
use std::net::IpAddr;

fn extra_field() -> HashMap<String, hcl::Value> {
    HashMap::new()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBond {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVlan {
    pub id: u16,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub ipv4: Vec<Ipv4Net>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawInterface {
    pub name: String,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub mtu: Option<u32>,
    #[serde(default)]
    pub ipv4: Vec<Ipv4Net>,
    #[serde(default)]
    pub dhcp: bool,
    #[serde(default)]
    pub vrf: Option<String>,
    #[serde(default)]
    pub bond: Option<RawBond>,
    #[serde(default)]
    pub vlans: Vec<RawVlan>,
    #[serde(default = "extra_field", flatten)]
    pub extra: HashMap<String, hcl::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawZoneManagement {
    #[serde(default)]
    pub web_ui: bool,
    #[serde(default)]
    pub ssh: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawZone {
    pub name: String,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub source_cidrs: Vec<IpNet>,
    #[serde(default)]
    pub management: Option<RawZoneManagement>,
    #[serde(default = "extra_field", flatten)]
    pub extra: HashMap<String, hcl::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRule {
    pub name: String,
    pub action: String,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default)]
    pub dest: Option<String>,
    #[serde(default)]
    pub dest_port: Option<String>,
    #[serde(default)]
    pub time_start: Option<String>,
    #[serde(default)]
    pub time_end: Option<String>,
    #[serde(default)]
    pub days: Vec<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub tcp_flags: Option<String>,
    #[serde(default)]
    pub max_connections: Option<u32>,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPolicy {
    pub from_zone: String,
    pub to_zone: String,
    pub default_action: String,
    #[serde(default, rename = "rule")]
    pub rules: Vec<RawRule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawIpSet {
    pub name: String,
    #[serde(default)]
    pub dynamic: bool,
    #[serde(default)]
    pub static_members: Vec<IpNet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawVrf {
    pub name: String,
    #[serde(default)]
    pub table_id: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDhcpScope {
    #[serde(default)]
    pub interface: String,
    #[serde(default)]
    pub range_start: Option<IpAddr>,
    #[serde(default)]
    pub range_end: Option<IpAddr>,
    #[serde(default)]
    pub lease_seconds: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDhcp {
    #[serde(default, rename = "scope")]
    pub scopes: Vec<RawDhcpScope>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDns {
    #[serde(default)]
    pub egress_filtering: bool,
    #[serde(default)]
    pub egress_set: Option<String>,
    #[serde(default)]
    pub override_ttl_secs: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSsh {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVpn {
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMdns {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub bindings: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReplication {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub peers: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHa {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub node_id: Option<String>,
    #[serde(default)]
    pub peers: Vec<IpAddr>,
    #[serde(default)]
    pub heartbeat_port: Option<u16>,
    #[serde(default)]
    pub heartbeat_interval_secs: Option<u64>,
    #[serde(default)]
    pub failure_threshold: Option<u32>,
    #[serde(default)]
    pub priority: Option<u32>,
    #[serde(default)]
    pub failback_delay_secs: Option<u64>,
    #[serde(default)]
    pub shared_secret: Option<String>,
}

/// The document root.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub ip_forwarding: bool,
    #[serde(default)]
    pub ipv6_forwarding: bool,
    #[serde(default)]
    pub state_dir: Option<String>,
    #[serde(default)]
    pub log_dir: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,

    #[serde(default, rename = "interface")]
    pub interfaces: Vec<RawInterface>,
    #[serde(default, rename = "zone")]
    pub zones: Vec<RawZone>,
    #[serde(default, rename = "policy")]
    pub policies: Vec<RawPolicy>,
    #[serde(default, rename = "ipset")]
    pub ipsets: Vec<RawIpSet>,
    #[serde(default, rename = "vrf")]
    pub vrfs: Vec<RawVrf>,

    #[serde(default)]
    pub dhcp: Option<RawDhcp>,
    #[serde(default)]
    pub dns: Option<RawDns>,
    #[serde(default)]
    pub ssh: Option<RawSsh>,
    #[serde(default)]
    pub vpn: Option<RawVpn>,
    #[serde(default)]
    pub mdns: Option<RawMdns>,
    #[serde(default)]
    pub ha: Option<RawHa>,
    #[serde(default)]
    pub replication: Option<RawReplication>,
}

fn default_schema_version() -> u32 {
    ward_core::SCHEMA_VERSION
}

#[cfg(test)]
#[path = "raw_tests.rs"]
mod tests;
