// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Network Reconciler: the `ApplyHook` that turns a config diff into an
//! ordered sequence of kernel operations, then drives the Packet-Filter
//! Layer last.
//!
//! Snapshots the world, walks each entity kind, and pushes it toward the
//! desired state one category at a time, logging what moved.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use ward_adapters::{LinkError, LinkLayer, PacketFilter, PacketFilterError};
use ward_core::{diff, ApplyHook, Change, Config, ConfigDiff, HookError, Interface};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("referential integrity: {0}")]
    ReferentialIntegrity(String),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    PacketFilter(#[from] PacketFilterError),
}

impl From<ReconcileError> for HookError {
    fn from(err: ReconcileError) -> Self {
        HookError::new(err.to_string())
    }
}

/// Deep-copies the interfaces subtree so a risky operation (HA migration,
/// upgrade handoff) can restore it afterward without re-diffing against a
/// config snapshot.
pub fn snapshot_interfaces(config: &Config) -> Vec<Interface> {
    config.interfaces.clone()
}

/// Overwrites `config.interfaces` with a previously captured snapshot.
pub fn restore_interfaces(config: &mut Config, snapshot: Vec<Interface>) {
    config.interfaces = snapshot;
}

fn check_referential_integrity(staged: &Config, d: &ConfigDiff) -> Result<(), ReconcileError> {
    for change in &d.interfaces {
        let Change::Removed(iface) = change else { continue };
        let name = iface.name.as_str();

        if let Some(zone) = staged.zones.iter().find(|z| z.interface_matches().any(|m| m == name)) {
            return Err(ReconcileError::ReferentialIntegrity(format!(
                "interface {name} removed but zone {} still matches it",
                zone.name
            )));
        }
        if staged.dhcp.as_ref().is_some_and(|dhcp| dhcp.scopes.iter().any(|s| s.interface == name)) {
            return Err(ReconcileError::ReferentialIntegrity(format!(
                "interface {name} removed but a DHCP scope still targets it"
            )));
        }
        if staged.mdns.as_ref().is_some_and(|mdns| mdns.bindings.iter().any(|b| b == name)) {
            return Err(ReconcileError::ReferentialIntegrity(format!(
                "interface {name} removed but mDNS still binds it"
            )));
        }
        for other in &staged.interfaces {
            if other.bond.as_ref().is_some_and(|b| b.members.iter().any(|m| m == name)) {
                return Err(ReconcileError::ReferentialIntegrity(format!(
                    "interface {name} removed but bond {} still lists it as a member",
                    other.name
                )));
            }
            if other.vlan_child_names().any(|c| c == name) {
                return Err(ReconcileError::ReferentialIntegrity(format!(
                    "interface {name} removed but it is still implied as a VLAN child of {}",
                    other.name
                )));
            }
        }
    }
    Ok(())
}

/// Diffs `running` against `staged` and pushes the kernel through five
/// ordered steps: interfaces, bonds, VLANs, routes, then packet filter.
pub struct NetworkReconciler<L: LinkLayer, P: PacketFilter> {
    link: Arc<L>,
    packet_filter: Arc<P>,
}

impl<L: LinkLayer, P: PacketFilter> NetworkReconciler<L, P> {
    pub fn new(link: Arc<L>, packet_filter: Arc<P>) -> Self {
        Self { link, packet_filter }
    }

    async fn converge(&self, staged: &Config, d: &ConfigDiff) -> Result<(), ReconcileError> {
        // a. VRFs, created/updated before anything might enslave into them.
        for change in &d.vrfs {
            if let Change::Added(vrf) | Change::Modified(_, vrf) = change {
                self.link.ensure_vrf(&vrf.name, vrf.table_id.unwrap_or(0)).await?;
            }
        }

        // b. bonds and VLANs (bond slaves are attached inside create_bond).
        for change in &d.interfaces {
            if let Change::Added(iface) | Change::Modified(_, iface) = change {
                if let Some(bond) = &iface.bond {
                    self.link.create_bond(&iface.name, bond).await?;
                }
                for vlan in &iface.vlans {
                    self.link.create_vlan(&iface.name, vlan).await?;
                }
            }
        }
        // VLANs dropped from a still-surviving interface's config.
        for change in &d.interfaces {
            if let Change::Modified(old, new) = change {
                for old_vlan in &old.vlans {
                    if !new.vlans.iter().any(|v| v.id == old_vlan.id) {
                        self.link.delete_vlan(&new.name, old_vlan.id).await?;
                    }
                }
            }
        }

        // c. per-interface settle: MTU, VRF enslavement, addressing, admin state.
        // DHCP client lifecycle itself is out of scope; `iface.dhcp` only
        // means "skip static addressing, a DHCP lease will cover it".
        for change in &d.interfaces {
            let Change::Added(iface) | Change::Modified(_, iface) = change else { continue };
            if let Some(mtu) = iface.mtu {
                self.link.set_mtu(&iface.name, mtu).await?;
            }
            if let Some(vrf) = &iface.vrf {
                self.link.enslave_vrf(&iface.name, vrf).await?;
            }
            self.link.flush_addresses(&iface.name).await?;
            if !iface.ipv4.is_empty() {
                self.link.set_addresses(&iface.name, &iface.ipv4).await?;
            }
            self.link.set_admin_state(&iface.name, !iface.disabled).await?;
        }

        // d. delete interfaces absent from staged: children before parents.
        for change in &d.interfaces {
            if let Change::Removed(iface) = change {
                for vlan in &iface.vlans {
                    self.link.delete_vlan(&iface.name, vlan.id).await?;
                }
            }
        }
        for change in &d.interfaces {
            if let Change::Removed(iface) = change {
                if iface.bond.is_some() {
                    self.link.delete_bond(&iface.name).await?;
                }
            }
        }
        for change in &d.vrfs {
            if let Change::Removed(vrf) = change {
                self.link.delete_vrf(&vrf.name).await?;
            }
        }

        // e. packet-filter apply, last, so the new ipsets/zones it may
        // reference are already kernel-resident.
        self.packet_filter.apply(&staged.policies, &staged.ipsets).await?;

        Ok(())
    }
}

#[async_trait]
impl<L: LinkLayer, P: PacketFilter> ApplyHook for NetworkReconciler<L, P> {
    fn name(&self) -> &'static str {
        "network_reconciler"
    }

    async fn apply(&self, running: &Config, staged: &Config) -> Result<(), HookError> {
        let d = diff(running, staged);
        check_referential_integrity(staged, &d)?;
        self.converge(staged, &d).await.map_err(Into::into)
    }

    /// Re-derives a full create-everything diff against an empty baseline
    /// rather than trying to reconstruct exactly what the failed `apply`
    /// left behind: every `LinkLayer`/`PacketFilter` operation is
    /// idempotent, so converging from nothing is safe and guarantees the
    /// kernel ends up matching `running` regardless of how far the failed
    /// apply got.
    async fn rollback(&self, running: &Config) -> Result<(), HookError> {
        let baseline = Config::default();
        let d = diff(&baseline, running);
        self.converge(running, &d).await.map_err(Into::into)
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
