// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structural and referential validation of a staged [`Config`], the
//! common check behind the Config Manager's `Validate`/`DryRun`. Unlike
//! [`crate::apply_hook`]'s apply-time failures, this collects every
//! problem into a [`ValidationReport`] instead of aborting at the first
//! one.

use std::collections::HashSet;

use super::{Config, ValidationReport, MTU_MAX, MTU_MIN};

/// Checks a config in isolation: no I/O, no comparison against a
/// `running` baseline — just internal consistency.
pub fn validate(config: &Config) -> ValidationReport {
    let mut report = ValidationReport::default();

    check_duplicate_names(config, &mut report);
    check_mtu_ranges(config, &mut report);
    check_zone_references(config, &mut report);
    check_policy_references(config, &mut report);
    check_bond_and_vlan_references(config, &mut report);

    report
}

fn check_duplicate_names(config: &Config, report: &mut ValidationReport) {
    let mut seen = HashSet::new();
    for iface in &config.interfaces {
        if !seen.insert(iface.name.as_str()) {
            report.push_error("interfaces", format!("duplicate interface name {}", iface.name));
        }
    }

    let mut seen = HashSet::new();
    for zone in &config.zones {
        if !seen.insert(zone.name.as_str()) {
            report.push_error("zones", format!("duplicate zone name {}", zone.name));
        }
    }

    let mut seen = HashSet::new();
    for ipset in &config.ipsets {
        if !seen.insert(ipset.name.as_str()) {
            report.push_error("ipsets", format!("duplicate ipset name {}", ipset.name));
        }
    }
}

fn check_mtu_ranges(config: &Config, report: &mut ValidationReport) {
    for iface in &config.interfaces {
        if let Some(mtu) = iface.mtu {
            if !(MTU_MIN..=MTU_MAX).contains(&mtu) {
                report.push_error(
                    format!("interfaces.{}.mtu", iface.name),
                    format!("mtu {mtu} outside the allowed range {MTU_MIN}-{MTU_MAX}"),
                );
            }
        }
    }
}

fn check_zone_references(config: &Config, report: &mut ValidationReport) {
    let interface_names: HashSet<&str> = config.all_interface_names().iter().map(String::as_str).collect();
    for zone in &config.zones {
        for name in zone.interface_matches() {
            if !interface_names.contains(name) {
                report.push_error(
                    format!("zones.{}", zone.name),
                    format!("zone matches unknown interface {name}"),
                );
            }
        }
    }

    for iface in &config.interfaces {
        if let Some(zone) = &iface.zone {
            if config.zone(zone).is_none() {
                report.push_error(
                    format!("interfaces.{}.zone", iface.name),
                    format!("interface references unknown zone {zone}"),
                );
            }
        }
        for vlan in &iface.vlans {
            if let Some(zone) = &vlan.zone {
                if config.zone(zone).is_none() {
                    report.push_error(
                        format!("interfaces.{}.vlans.{}.zone", iface.name, vlan.id),
                        format!("vlan references unknown zone {zone}"),
                    );
                }
            }
        }
    }
}

fn check_policy_references(config: &Config, report: &mut ValidationReport) {
    let zone_names: HashSet<&str> = config.zones.iter().map(|z| z.name.as_str()).collect();
    for policy in &config.policies {
        if !zone_names.contains(policy.from_zone.as_str()) {
            report.push_error(
                format!("policies.{}->{}", policy.from_zone, policy.to_zone),
                format!("policy references unknown from-zone {}", policy.from_zone),
            );
        }
        if !zone_names.contains(policy.to_zone.as_str()) {
            report.push_error(
                format!("policies.{}->{}", policy.from_zone, policy.to_zone),
                format!("policy references unknown to-zone {}", policy.to_zone),
            );
        }
    }
}

fn check_bond_and_vlan_references(config: &Config, report: &mut ValidationReport) {
    let interface_names: HashSet<&str> = config.interfaces.iter().map(|i| i.name.as_str()).collect();
    for iface in &config.interfaces {
        if let Some(bond) = &iface.bond {
            for member in &bond.members {
                if !interface_names.contains(member.as_str()) {
                    report.push_error(
                        format!("interfaces.{}.bond", iface.name),
                        format!("bond member {member} is not a known interface"),
                    );
                }
                if member == &iface.name {
                    report.push_error(
                        format!("interfaces.{}.bond", iface.name),
                        "bond cannot list itself as a member".to_string(),
                    );
                }
            }
        }
        let mut seen_vlan_ids = HashSet::new();
        for vlan in &iface.vlans {
            if !seen_vlan_ids.insert(vlan.id) {
                report.push_error(
                    format!("interfaces.{}.vlans", iface.name),
                    format!("duplicate vlan id {} on interface {}", vlan.id, iface.name),
                );
            }
        }
    }
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
