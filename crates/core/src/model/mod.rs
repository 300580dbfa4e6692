// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The declarative configuration tree: the sole payload a [`Config`] carries
//! between stage, validate, and apply.

mod interface;
mod ipset;
mod policy;
mod sections;
mod validate;
mod virtual_resource;
mod zone;

pub use interface::{Bond, BondMode, Interface, Vlan, MTU_MAX, MTU_MIN};
pub use ipset::IpSet;
pub use policy::{Action, AddressMatch, PortSpec, Policy, Protocol, Rule, TimeOfDay, Weekday};
pub use sections::{
    DhcpConfig, DhcpScope, DnsConfig, HaConfig, HaMode, MdnsConfig, ReplicationConfig, SshConfig,
    VpnConfig, VrfConfig,
};
pub use validate::validate;
pub use virtual_resource::{MacAddr, VirtualIp, VirtualMac, VirtualResource};
pub use zone::{Zone, ZoneManagement, ZoneMatch};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Current on-disk/wire schema version. Bumped on any breaking change to
/// [`Config`]'s shape; the Config Loader rejects files declaring a newer one.
pub const SCHEMA_VERSION: u32 = 1;

/// The full declarative network/firewall configuration tree.
///
/// This is the sole unit the Config Manager stages, validates, diffs, and
/// applies. Two instances (`running`, `staged`) exist at any moment; there is
/// never a third.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default)]
    pub ip_forwarding: bool,
    #[serde(default)]
    pub ipv6_forwarding: bool,

    #[serde(default)]
    pub state_dir: Option<PathBuf>,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default)]
    pub timezone: Option<String>,

    #[serde(default)]
    pub interfaces: Vec<Interface>,
    #[serde(default)]
    pub zones: Vec<Zone>,
    #[serde(default)]
    pub policies: Vec<Policy>,
    #[serde(default)]
    pub ipsets: Vec<IpSet>,
    #[serde(default)]
    pub vrfs: Vec<VrfConfig>,

    #[serde(default)]
    pub dhcp: Option<DhcpConfig>,
    #[serde(default)]
    pub dns: Option<DnsConfig>,
    #[serde(default)]
    pub ssh: Option<SshConfig>,
    #[serde(default)]
    pub vpn: Option<VpnConfig>,
    #[serde(default)]
    pub mdns: Option<MdnsConfig>,
    #[serde(default)]
    pub ha: Option<HaConfig>,
    #[serde(default)]
    pub replication: Option<ReplicationConfig>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            ip_forwarding: false,
            ipv6_forwarding: false,
            state_dir: None,
            log_dir: None,
            timezone: None,
            interfaces: Vec::new(),
            zones: Vec::new(),
            policies: Vec::new(),
            ipsets: Vec::new(),
            vrfs: Vec::new(),
            dhcp: None,
            dns: None,
            ssh: None,
            vpn: None,
            mdns: None,
            ha: None,
            replication: None,
        }
    }
}

impl Config {
    pub fn interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces.iter().find(|i| i.name == name)
    }

    pub fn zone(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.name == name)
    }

    pub fn ipset(&self, name: &str) -> Option<&IpSet> {
        self.ipsets.iter().find(|s| s.name == name)
    }

    /// All interface names, including implied VLAN children, declared by this config.
    pub fn all_interface_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for iface in &self.interfaces {
            names.push(iface.name.clone());
            names.extend(iface.vlan_child_names());
        }
        names
    }

    pub fn ha_enabled(&self) -> bool {
        matches!(self.ha.as_ref(), Some(ha) if ha.mode != HaMode::Disabled)
    }
}

/// Provenance attached to a [`Config`] instance by the Config Manager: who
/// staged it, when, and from which source. Not part of the HCL/JSON tree
/// itself; kept alongside it in memory and in the config history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMeta {
    pub generation: u64,
    pub staged_at: Option<jiff::Timestamp>,
    pub applied_at: Option<jiff::Timestamp>,
    pub source: ConfigSource,
    pub comment: Option<String>,
}

impl ConfigMeta {
    pub fn new(generation: u64, source: ConfigSource) -> Self {
        Self { generation, staged_at: None, applied_at: None, source, comment: None }
    }
}

/// Where a staged configuration generation originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    ControlSocket,
    FileReload,
    Rollback,
    Bootstrap,
}

/// One problem surfaced by validation: which path in the tree, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { path: path.into(), message: message.into() }
    }
}

/// The outcome of validating a staged [`Config`] against referential and
/// range constraints, prior to it being eligible for Apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push_error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue::new(path, message));
    }

    pub fn push_warning(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue::new(path, message));
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
