// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parses the declarative HCL document into a [`Config`]: read →
//! `hcl::from_str::<RawConfig>` → normalize defaults → static validation →
//! typed [`Config`].

use crate::error::{LoadError, RecoveredError, Warning};
use crate::raw::{RawConfig, RawInterface, RawPolicy, RawRule, RawVlan, RawZone};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};
use ward_core::{
    Action, AddressMatch, Bond, BondMode, Config, DhcpConfig, DhcpScope, DnsConfig, HaConfig,
    HaMode, Interface, IpSet, MdnsConfig, PortSpec, Policy, Protocol, ReplicationConfig, Rule,
    SshConfig, TimeOfDay, Vlan, VpnConfig, VrfConfig, Weekday, Zone, ZoneManagement, ZoneMatch,
    MTU_MAX, MTU_MIN, SCHEMA_VERSION,
};

/// Strictly load and convert a config file: the first structural problem
/// aborts the whole load.
pub fn load(path: &Path) -> Result<(Config, Vec<Warning>), LoadError> {
    let raw = parse(path)?;
    let mut ctx = Convert { forgiving: false, warnings: Vec::new(), recovered: Vec::new() };
    let config = ctx.convert(raw, &path.display().to_string())?;
    Ok((config, ctx.warnings))
}

/// Load and convert a config file, substituting documented defaults for
/// `ReferenceError`/`RangeError` at the per-field level instead of aborting.
/// `SyntaxError`/`SchemaMismatch` always abort: the document could not be
/// parsed at all, so there is nothing to forgive.
pub fn forgiving_load(path: &Path) -> Result<(Config, Vec<Warning>, Vec<RecoveredError>), LoadError> {
    let raw = parse(path)?;
    let mut ctx = Convert { forgiving: true, warnings: Vec::new(), recovered: Vec::new() };
    let config = ctx.convert(raw, &path.display().to_string())?;
    Ok((config, ctx.warnings, ctx.recovered))
}

fn parse(path: &Path) -> Result<RawConfig, LoadError> {
    let path_str = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|e| LoadError::SyntaxError {
        path: path_str.clone(),
        message: format!("could not read file: {e}"),
    })?;
    let raw: RawConfig = hcl::from_str(&content).map_err(|e| LoadError::SyntaxError {
        path: path_str.clone(),
        message: e.to_string(),
    })?;
    if raw.schema_version > SCHEMA_VERSION {
        return Err(LoadError::SchemaMismatch {
            path: path_str,
            found: raw.schema_version,
            supported: SCHEMA_VERSION,
        });
    }
    debug!(path = %path_str, schema_version = raw.schema_version, "parsed config document");
    Ok(raw)
}

struct Convert {
    forgiving: bool,
    warnings: Vec<Warning>,
    recovered: Vec<RecoveredError>,
}

impl Convert {
    fn convert(&mut self, raw: RawConfig, path: &str) -> Result<Config, LoadError> {
        let mut config = Config {
            schema_version: raw.schema_version,
            ip_forwarding: raw.ip_forwarding,
            ipv6_forwarding: raw.ipv6_forwarding,
            state_dir: raw.state_dir.map(Into::into),
            log_dir: raw.log_dir.map(Into::into),
            timezone: raw.timezone,
            ..Config::default()
        };

        for iface in raw.interfaces {
            config.interfaces.push(self.convert_interface(iface, path)?);
        }
        for zone in raw.zones {
            config.zones.push(self.convert_zone(zone));
        }
        let known_zones: std::collections::HashSet<String> =
            config.zones.iter().map(|z| z.name.clone()).collect();
        for policy in raw.policies {
            match self.convert_policy(policy, path, &known_zones)? {
                Some(p) => config.policies.push(p),
                None => continue,
            }
        }
        for set in raw.ipsets {
            config.ipsets.push(IpSet {
                name: set.name,
                dynamic: set.dynamic,
                static_members: set.static_members,
            });
        }
        for vrf in raw.vrfs {
            config.vrfs.push(VrfConfig { name: vrf.name, table_id: vrf.table_id });
        }

        config.dhcp = raw.dhcp.map(|d| DhcpConfig {
            scopes: d
                .scopes
                .into_iter()
                .map(|s| DhcpScope {
                    interface: s.interface,
                    range_start: s.range_start.unwrap_or(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)),
                    range_end: s.range_end.unwrap_or(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)),
                    lease_seconds: s.lease_seconds,
                })
                .collect(),
        });
        config.dns = raw.dns.map(|d| {
            let mut dns = DnsConfig { egress_filtering: d.egress_filtering, ..DnsConfig::default() };
            if let Some(set) = d.egress_set {
                dns.egress_set = set;
            }
            if let Some(ttl) = d.override_ttl_secs {
                dns.override_ttl_secs = ttl;
            }
            dns
        });
        config.ssh = raw.ssh.map(|s| SshConfig { enabled: s.enabled, port: s.port });
        config.vpn = raw.vpn.map(|v| VpnConfig { enabled: v.enabled });
        config.mdns = raw.mdns.map(|m| MdnsConfig { enabled: m.enabled, bindings: m.bindings });
        config.replication =
            raw.replication.map(|r| ReplicationConfig { enabled: r.enabled, peers: r.peers });
        if let Some(ha) = raw.ha {
            config.ha = Some(self.convert_ha(ha)?);
        }

        Ok(config)
    }

    fn convert_interface(&mut self, raw: RawInterface, path: &str) -> Result<Interface, LoadError> {
        for (key, _) in &raw.extra {
            self.warnings.push(Warning::new(
                format!("{path}: interface {:?}", raw.name),
                format!("unknown attribute {key:?} preserved, not applied"),
            ));
        }

        let mtu = match raw.mtu {
            None => None,
            Some(m) if (MTU_MIN..=MTU_MAX).contains(&m) => Some(m),
            Some(m) => {
                let field_path = format!("interfaces[{:?}].mtu", raw.name);
                let err = LoadError::RangeError {
                    path: field_path.clone(),
                    message: format!("{m} outside [{MTU_MIN}, {MTU_MAX}]"),
                };
                if self.forgiving {
                    self.recovered.push(RecoveredError {
                        path: field_path,
                        message: err.to_string(),
                        substituted_default: "null (platform default)".into(),
                    });
                    None
                } else {
                    return Err(err);
                }
            }
        };

        let vlans = raw.vlans.into_iter().map(convert_vlan).collect();

        Ok(Interface {
            name: raw.name,
            zone: raw.zone,
            disabled: raw.disabled,
            mtu,
            ipv4: raw.ipv4,
            dhcp: raw.dhcp,
            vrf: raw.vrf,
            bond: raw.bond.and_then(|b| convert_bond(b, &mut self.warnings)),
            vlans,
        })
    }

    fn convert_zone(&mut self, raw: RawZone) -> Zone {
        for (key, _) in &raw.extra {
            self.warnings.push(Warning::new(
                format!("zone {:?}", raw.name),
                format!("unknown attribute {key:?} preserved, not applied"),
            ));
        }
        let mut matches: Vec<ZoneMatch> =
            raw.interfaces.into_iter().map(ZoneMatch::Interface).collect();
        matches.extend(raw.source_cidrs.into_iter().map(ZoneMatch::SourceCidr));
        Zone {
            name: raw.name,
            matches,
            management: raw.management.map(|m| ZoneManagement { web_ui: m.web_ui, ssh: m.ssh }),
        }
    }

    fn convert_policy(
        &mut self,
        raw: RawPolicy,
        path: &str,
        known_zones: &std::collections::HashSet<String>,
    ) -> Result<Option<Policy>, LoadError> {
        for zone_name in [&raw.from_zone, &raw.to_zone] {
            if !known_zones.contains(zone_name) {
                let field_path = format!("policy[{:?} -> {:?}]", raw.from_zone, raw.to_zone);
                let err = LoadError::ReferenceError {
                    path: field_path.clone(),
                    reference: zone_name.clone(),
                };
                if self.forgiving {
                    warn!(path = %path, %field_path, zone = %zone_name, "dropping policy, unknown zone");
                    self.recovered.push(RecoveredError {
                        path: field_path,
                        message: err.to_string(),
                        substituted_default: "policy dropped".into(),
                    });
                    return Ok(None);
                }
                return Err(err);
            }
        }

        let default_action = self.convert_action(&raw.default_action, "default_action")?;
        let mut rules = Vec::with_capacity(raw.rules.len());
        for rule in raw.rules {
            if let Some(converted) = self.convert_rule(rule)? {
                rules.push(converted);
            }
        }
        Ok(Some(Policy { from_zone: raw.from_zone, to_zone: raw.to_zone, default_action, rules }))
    }

    fn convert_rule(&mut self, raw: RawRule) -> Result<Option<Rule>, LoadError> {
        let action = self.convert_action(&raw.action, &format!("rule[{:?}].action", raw.name))?;
        let protocol = match raw.protocol.as_deref() {
            None => None,
            Some(p) => Some(self.convert_protocol(p, &format!("rule[{:?}].protocol", raw.name))?),
        };
        let dest_port = match raw.dest_port.as_deref() {
            None => None,
            Some(p) => Some(self.convert_port_spec(p, &format!("rule[{:?}].dest_port", raw.name))?),
        };
        let mut days = Vec::with_capacity(raw.days.len());
        for day in &raw.days {
            days.push(self.convert_weekday(day, &format!("rule[{:?}].days", raw.name))?);
        }
        let time_start = match raw.time_start.as_deref() {
            None => None,
            Some(t) => Some(self.convert_time_of_day(t, &format!("rule[{:?}].time_start", raw.name))?),
        };
        let time_end = match raw.time_end.as_deref() {
            None => None,
            Some(t) => Some(self.convert_time_of_day(t, &format!("rule[{:?}].time_end", raw.name))?),
        };

        Ok(Some(Rule {
            name: raw.name,
            action,
            protocol,
            src: raw.src.map(|s| parse_address_match(&s)),
            dest: raw.dest.map(|s| parse_address_match(&s)),
            dest_port,
            time_start,
            time_end,
            days,
            timezone: raw.timezone,
            tcp_flags: raw.tcp_flags,
            max_connections: raw.max_connections,
            disabled: raw.disabled,
        }))
    }

    fn convert_ha(&mut self, raw: crate::raw::RawHa) -> Result<HaConfig, LoadError> {
        let mode = match raw.mode.as_deref() {
            None | Some("disabled") => HaMode::Disabled,
            Some("primary") => HaMode::Primary,
            Some("backup") => HaMode::Backup,
            Some(other) => {
                return self.range_error_or_default(
                    "ha.mode",
                    format!("unknown HA mode {other:?}"),
                    HaMode::Disabled,
                    "disabled",
                )
            }
        };
        let node_id = raw.node_id.unwrap_or_default();
        let mut ha = HaConfig::disabled(node_id);
        ha.mode = mode;
        ha.peers = raw.peers;
        if let Some(port) = raw.heartbeat_port {
            ha.heartbeat_port = port;
        }
        if let Some(secs) = raw.heartbeat_interval_secs {
            ha.heartbeat_interval = std::time::Duration::from_secs(secs);
        }
        if let Some(threshold) = raw.failure_threshold {
            ha.failure_threshold = threshold;
        }
        if let Some(priority) = raw.priority {
            ha.priority = priority;
        }
        if let Some(secs) = raw.failback_delay_secs {
            ha.failback_delay = std::time::Duration::from_secs(secs);
        }
        ha.shared_secret = raw.shared_secret;
        Ok(ha)
    }

    fn convert_action(&mut self, raw: &str, path: &str) -> Result<Action, LoadError> {
        match raw {
            "accept" => Ok(Action::Accept),
            "drop" => Ok(Action::Drop),
            "reject" => Ok(Action::Reject),
            other => self.range_error_or_default(
                path,
                format!("unknown action {other:?}"),
                Action::Drop,
                "drop",
            ),
        }
    }

    fn convert_protocol(&mut self, raw: &str, path: &str) -> Result<Protocol, LoadError> {
        match raw {
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            "icmp" => Ok(Protocol::Icmp),
            other => self.range_error_or_default(
                path,
                format!("unknown protocol {other:?}"),
                Protocol::Tcp,
                "tcp",
            ),
        }
    }

    fn convert_port_spec(&mut self, raw: &str, path: &str) -> Result<PortSpec, LoadError> {
        if let Some((lo, hi)) = raw.split_once('-') {
            if let (Ok(lo), Ok(hi)) = (lo.parse(), hi.parse()) {
                return Ok(PortSpec::Range(lo, hi));
            }
        } else if let Ok(port) = raw.parse() {
            return Ok(PortSpec::Single(port));
        }
        self.range_error_or_default(
            path,
            format!("invalid port spec {raw:?}"),
            PortSpec::Single(0),
            "0",
        )
    }

    fn convert_weekday(&mut self, raw: &str, path: &str) -> Result<Weekday, LoadError> {
        match raw {
            "Monday" => Ok(Weekday::Monday),
            "Tuesday" => Ok(Weekday::Tuesday),
            "Wednesday" => Ok(Weekday::Wednesday),
            "Thursday" => Ok(Weekday::Thursday),
            "Friday" => Ok(Weekday::Friday),
            "Saturday" => Ok(Weekday::Saturday),
            "Sunday" => Ok(Weekday::Sunday),
            other => self.range_error_or_default(
                path,
                format!("unknown weekday {other:?}"),
                Weekday::Monday,
                "Monday",
            ),
        }
    }

    fn convert_time_of_day(&mut self, raw: &str, path: &str) -> Result<TimeOfDay, LoadError> {
        match TimeOfDay::from_str(raw) {
            Ok(t) => Ok(t),
            Err(message) => self.range_error_or_default(path, message, TimeOfDay::new(0, 0), "00:00"),
        }
    }

    fn range_error_or_default<T>(
        &mut self,
        path: &str,
        message: String,
        default: T,
        default_label: &str,
    ) -> Result<T, LoadError> {
        let err = LoadError::RangeError { path: path.to_string(), message };
        if self.forgiving {
            self.recovered.push(RecoveredError {
                path: path.to_string(),
                message: err.to_string(),
                substituted_default: default_label.to_string(),
            });
            Ok(default)
        } else {
            Err(err)
        }
    }
}

fn convert_vlan(raw: RawVlan) -> Vlan {
    Vlan { id: raw.id, zone: raw.zone, ipv4: raw.ipv4 }
}

fn convert_bond(raw: crate::raw::RawBond, warnings: &mut Vec<Warning>) -> Option<Bond> {
    let mode = match raw.mode.as_deref() {
        Some("active-backup") => BondMode::ActiveBackup,
        Some("8023ad") => BondMode::Balanced8023ad,
        Some("balance-xor") => BondMode::BalanceXor,
        Some("broadcast") => BondMode::BroadcastBond,
        Some(other) => {
            warnings.push(Warning::new("bond.mode", format!("unknown bond mode {other:?}, defaulting to active-backup")));
            BondMode::ActiveBackup
        }
        None => BondMode::ActiveBackup,
    };
    Some(Bond { mode, members: raw.members })
}

/// `zone:<name>` / `ipset:<name>` / `alias:<name>` prefixes select the
/// non-literal [`AddressMatch`] variants; anything else is a CIDR if it
/// parses as one, else a bare host string.
fn parse_address_match(raw: &str) -> AddressMatch {
    if let Some(zone) = raw.strip_prefix("zone:") {
        return AddressMatch::ZoneMember(zone.to_string());
    }
    if let Some(set) = raw.strip_prefix("ipset:") {
        return AddressMatch::IpSet(set.to_string());
    }
    if let Some(alias) = raw.strip_prefix("alias:") {
        return AddressMatch::Alias(alias.to_string());
    }
    if raw.parse::<ipnet::IpNet>().is_ok() || raw.parse::<std::net::IpAddr>().is_ok() {
        return AddressMatch::Cidr(raw.to_string());
    }
    AddressMatch::Host(raw.to_string())
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
