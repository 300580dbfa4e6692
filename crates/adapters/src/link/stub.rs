// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Non-Linux / test [`LinkLayer`]: an in-memory mirror that returns
//! deterministic canned state and never touches the kernel. Every
//! operation succeeds except those that cannot be meaningfully emulated
//! (`LinkError::Unsupported`).

use std::collections::HashMap;

use async_trait::async_trait;
use ipnet::Ipv4Net;
use parking_lot::Mutex;
use ward_core::{Bond, MacAddr, Vlan};

use super::{LinkError, LinkLayer, LinkStats, LinkStatus};

fn default_link(name: &str) -> LinkStatus {
    LinkStatus {
        name: name.to_string(),
        admin_up: true,
        oper_up: true,
        carrier: true,
        is_ethernet: true,
        mac: None,
        mtu: 1500,
        addresses: Vec::new(),
        driver: Some("stub".into()),
        speed_mbps: Some(1000),
        duplex: None,
        bond_members: Vec::new(),
        bond_active_members: Vec::new(),
        vlan_parent: None,
        vlan_id: None,
        stats: LinkStats::default(),
    }
}

/// In-memory [`LinkLayer`]. Interfaces not explicitly created are
/// synthesized on first query with [`default_link`]'s canned values, so
/// tests referencing a physical interface from config don't need to
/// pre-seed it.
#[derive(Default)]
pub struct StubLinkLayer {
    links: Mutex<HashMap<String, LinkStatus>>,
    vrf_membership: Mutex<HashMap<String, String>>,
}

impl StubLinkLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a canned interface state for tests exercising a specific
    /// admin/oper/carrier combination.
    pub fn seed(&self, link: LinkStatus) {
        self.links.lock().insert(link.name.clone(), link);
    }
}

#[async_trait]
impl LinkLayer for StubLinkLayer {
    async fn query(&self, name: &str) -> Result<LinkStatus, LinkError> {
        let mut links = self.links.lock();
        Ok(links.entry(name.to_string()).or_insert_with(|| default_link(name)).clone())
    }

    async fn query_all(&self) -> Result<Vec<LinkStatus>, LinkError> {
        Ok(self.links.lock().values().cloned().collect())
    }

    async fn ensure_vrf(&self, name: &str, _table_id: u32) -> Result<(), LinkError> {
        let mut links = self.links.lock();
        links.entry(name.to_string()).or_insert_with(|| default_link(name));
        Ok(())
    }

    async fn delete_vrf(&self, name: &str) -> Result<(), LinkError> {
        self.links.lock().remove(name);
        Ok(())
    }

    async fn create_bond(&self, name: &str, bond: &Bond) -> Result<(), LinkError> {
        let mut links = self.links.lock();
        let link = links.entry(name.to_string()).or_insert_with(|| default_link(name));
        link.bond_members = bond.members.clone();
        link.bond_active_members = bond.members.clone();
        Ok(())
    }

    async fn delete_bond(&self, name: &str) -> Result<(), LinkError> {
        self.links.lock().remove(name);
        Ok(())
    }

    async fn create_vlan(&self, parent: &str, vlan: &Vlan) -> Result<(), LinkError> {
        let mut links = self.links.lock();
        let child = vlan.child_name(parent);
        let link = links.entry(child.clone()).or_insert_with(|| default_link(&child));
        link.vlan_parent = Some(parent.to_string());
        link.vlan_id = Some(vlan.id);
        link.addresses = vlan.ipv4.clone();
        Ok(())
    }

    async fn delete_vlan(&self, parent: &str, vlan_id: u16) -> Result<(), LinkError> {
        let child = format!("{parent}.{vlan_id}");
        self.links.lock().remove(&child);
        Ok(())
    }

    async fn flush_addresses(&self, name: &str) -> Result<(), LinkError> {
        let mut links = self.links.lock();
        let link = links.entry(name.to_string()).or_insert_with(|| default_link(name));
        link.addresses.clear();
        Ok(())
    }

    async fn set_addresses(&self, name: &str, addresses: &[Ipv4Net]) -> Result<(), LinkError> {
        let mut links = self.links.lock();
        let link = links.entry(name.to_string()).or_insert_with(|| default_link(name));
        link.addresses = addresses.to_vec();
        Ok(())
    }

    async fn add_address(&self, name: &str, address: Ipv4Net) -> Result<(), LinkError> {
        let mut links = self.links.lock();
        let link = links.entry(name.to_string()).or_insert_with(|| default_link(name));
        if !link.addresses.contains(&address) {
            link.addresses.push(address);
        }
        Ok(())
    }

    async fn remove_address(&self, name: &str, address: Ipv4Net) -> Result<(), LinkError> {
        let mut links = self.links.lock();
        let link = links.entry(name.to_string()).or_insert_with(|| default_link(name));
        link.addresses.retain(|a| *a != address);
        Ok(())
    }

    async fn enslave_vrf(&self, name: &str, vrf: &str) -> Result<(), LinkError> {
        self.vrf_membership.lock().insert(name.to_string(), vrf.to_string());
        Ok(())
    }

    async fn set_mtu(&self, name: &str, mtu: u32) -> Result<(), LinkError> {
        let mut links = self.links.lock();
        let link = links.entry(name.to_string()).or_insert_with(|| default_link(name));
        link.mtu = mtu;
        Ok(())
    }

    async fn set_admin_state(&self, name: &str, up: bool) -> Result<(), LinkError> {
        let mut links = self.links.lock();
        let link = links.entry(name.to_string()).or_insert_with(|| default_link(name));
        link.admin_up = up;
        link.oper_up = up;
        link.carrier = up;
        Ok(())
    }

    async fn set_hw_address(&self, name: &str, mac: MacAddr) -> Result<(), LinkError> {
        let mut links = self.links.lock();
        let link = links.entry(name.to_string()).or_insert_with(|| default_link(name));
        link.mac = Some(mac);
        Ok(())
    }
}

#[cfg(test)]
#[path = "stub_tests.rs"]
mod tests;
