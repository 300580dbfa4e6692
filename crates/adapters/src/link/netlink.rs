// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Linux [`LinkLayer`] backed by `rtnetlink`. VLAN/bond metadata netlink
//! under-reports (bonding slave state, VLAN parent ifindex) is filled in
//! from `/sys/class/net/<if>/...`, the same sysfs-fallback shape nipart's
//! `plugin_nispor` uses when netlink alone isn't enough.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use ipnet::Ipv4Net;
use netlink_packet_route::link::{LinkAttribute, LinkFlags};
use rtnetlink::Handle;
use ward_core::{Bond, BondMode, MacAddr, Vlan};

use super::{Duplex, LinkError, LinkLayer, LinkStats, LinkStatus};

/// Matches a netlink `NLE_EXIST`/`ENOENT` style failure so add/delete can
/// be squashed to success, keeping every mutating operation idempotent.
fn classify(err: rtnetlink::Error) -> LinkError {
    let text = err.to_string();
    if text.contains("File exists") {
        LinkError::AlreadyExists(text)
    } else if text.contains("No such device") || text.contains("not found") {
        LinkError::NotFound(text)
    } else {
        LinkError::Kernel(text)
    }
}

fn idempotent_add(err: LinkError) -> Result<(), LinkError> {
    match err {
        LinkError::AlreadyExists(_) => Ok(()),
        other => Err(other),
    }
}

fn idempotent_delete(err: LinkError) -> Result<(), LinkError> {
    match err {
        LinkError::NotFound(_) => Ok(()),
        other => Err(other),
    }
}

pub struct NetlinkLinkLayer {
    handle: Handle,
}

impl NetlinkLinkLayer {
    /// Opens a connection to the kernel's netlink route family, spawning
    /// its driving future onto the current tokio runtime.
    pub fn connect() -> Result<Self, LinkError> {
        let (connection, handle, _) =
            rtnetlink::new_connection().map_err(|e| LinkError::Kernel(e.to_string()))?;
        tokio::spawn(connection);
        Ok(Self { handle })
    }

    async fn index_of(&self, name: &str) -> Result<u32, LinkError> {
        let mut links = self.handle.link().get().match_name(name.to_string()).execute();
        match links.try_next().await.map_err(classify)? {
            Some(msg) => Ok(msg.header.index),
            None => Err(LinkError::NotFound(name.to_string())),
        }
    }

    fn sysfs_bond_members(name: &str) -> Vec<String> {
        read_sysfs_list(&format!("/sys/class/net/{name}/bonding/slaves"))
    }

    fn sysfs_bond_active_members(name: &str) -> Vec<String> {
        let path = format!("/sys/class/net/{name}/bonding/active_slave");
        std::fs::read_to_string(path)
            .ok()
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn sysfs_vlan_parent(name: &str) -> Option<String> {
        std::fs::read_to_string(format!("/sys/class/net/{name}/../{name}/lower_iface"))
            .ok()
            .map(|s| s.trim().to_string())
    }
}

fn read_sysfs_list(path: &str) -> Vec<String> {
    std::fs::read_to_string(path)
        .ok()
        .map(|s| s.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

#[async_trait]
impl LinkLayer for NetlinkLinkLayer {
    async fn query(&self, name: &str) -> Result<LinkStatus, LinkError> {
        let mut links = self.handle.link().get().match_name(name.to_string()).execute();
        let msg = links
            .try_next()
            .await
            .map_err(classify)?
            .ok_or_else(|| LinkError::NotFound(name.to_string()))?;

        let admin_up = msg.header.flags.contains(LinkFlags::Up);
        let oper_up = msg.header.flags.contains(LinkFlags::Running);
        let mut is_ethernet = false;
        let mut mac = None;
        let mut mtu = 1500;
        let mut driver = None;

        for attr in &msg.attributes {
            match attr {
                LinkAttribute::Address(bytes) if bytes.len() == 6 => {
                    let mut m = [0u8; 6];
                    m.copy_from_slice(bytes);
                    mac = Some(MacAddr::new(m));
                }
                LinkAttribute::Mtu(m) => mtu = *m,
                LinkAttribute::IfName(n) if n.contains("eth") || n.starts_with("en") => {
                    is_ethernet = true;
                }
                LinkAttribute::LinkInfo(_) => {}
                _ => {}
            }
        }
        let _ = &mut driver;

        Ok(LinkStatus {
            name: name.to_string(),
            admin_up,
            oper_up,
            carrier: oper_up,
            is_ethernet,
            mac,
            mtu,
            addresses: self.query_addresses(name).await?,
            driver,
            speed_mbps: None,
            duplex: None::<Duplex>,
            bond_members: Self::sysfs_bond_members(name),
            bond_active_members: Self::sysfs_bond_active_members(name),
            vlan_parent: Self::sysfs_vlan_parent(name),
            vlan_id: None,
            stats: LinkStats::default(),
        })
    }

    async fn query_all(&self) -> Result<Vec<LinkStatus>, LinkError> {
        let mut links = self.handle.link().get().execute();
        let mut names = Vec::new();
        while let Some(msg) = links.try_next().await.map_err(classify)? {
            for attr in &msg.attributes {
                if let LinkAttribute::IfName(n) = attr {
                    names.push(n.clone());
                }
            }
        }
        let mut out = Vec::with_capacity(names.len());
        for name in names {
            out.push(self.query(&name).await?);
        }
        Ok(out)
    }

    async fn ensure_vrf(&self, name: &str, table_id: u32) -> Result<(), LinkError> {
        let result =
            self.handle.link().add().vrf(name.to_string(), table_id).execute().await.map_err(classify);
        if let Err(err) = result {
            idempotent_add(err)?;
        }
        self.set_admin_state(name, true).await
    }

    async fn delete_vrf(&self, name: &str) -> Result<(), LinkError> {
        self.delete_bond(name).await
    }

    async fn create_bond(&self, name: &str, bond: &Bond) -> Result<(), LinkError> {
        let mode = match bond.mode {
            BondMode::ActiveBackup => "active-backup",
            BondMode::Balanced8023ad => "802.3ad",
            BondMode::BalanceXor => "balance-xor",
            BondMode::BroadcastBond => "broadcast",
        };
        let result = self
            .handle
            .link()
            .add()
            .bond(name.to_string())
            .mode(mode.to_string())
            .execute()
            .await
            .map_err(classify);
        if let Err(err) = result {
            idempotent_add(err)?;
        }
        for member in &bond.members {
            if let Ok(idx) = self.index_of(member).await {
                let bond_idx = self.index_of(name).await?;
                let _ = self.handle.link().set(idx).controller(bond_idx).execute().await;
            }
        }
        Ok(())
    }

    async fn delete_bond(&self, name: &str) -> Result<(), LinkError> {
        match self.index_of(name).await {
            Ok(idx) => self.handle.link().del(idx).execute().await.map_err(classify),
            Err(LinkError::NotFound(_)) => return Ok(()),
            Err(e) => return Err(e),
        }
        .or_else(idempotent_delete)
    }

    async fn create_vlan(&self, parent: &str, vlan: &Vlan) -> Result<(), LinkError> {
        let parent_idx = self.index_of(parent).await?;
        let result = self
            .handle
            .link()
            .add()
            .vlan(vlan.child_name(parent), parent_idx, vlan.id)
            .execute()
            .await
            .map_err(classify);
        if let Err(err) = result {
            idempotent_add(err)?;
        }
        if !vlan.ipv4.is_empty() {
            self.set_addresses(&vlan.child_name(parent), &vlan.ipv4).await?;
        }
        Ok(())
    }

    async fn delete_vlan(&self, parent: &str, vlan_id: u16) -> Result<(), LinkError> {
        let child = format!("{parent}.{vlan_id}");
        self.delete_bond(&child).await
    }

    async fn flush_addresses(&self, name: &str) -> Result<(), LinkError> {
        let idx = match self.index_of(name).await {
            Ok(idx) => idx,
            Err(LinkError::NotFound(_)) => return Ok(()),
            Err(e) => return Err(e),
        };
        let mut addrs = self.handle.address().get().set_link_index_filter(idx).execute();
        while let Some(addr) = addrs.try_next().await.map_err(classify)? {
            let _ = self.handle.address().del(addr).execute().await;
        }
        Ok(())
    }

    async fn set_addresses(&self, name: &str, addresses: &[Ipv4Net]) -> Result<(), LinkError> {
        self.flush_addresses(name).await?;
        let idx = self.index_of(name).await?;
        for addr in addresses {
            let result = self
                .handle
                .address()
                .add(idx, addr.addr().into(), addr.prefix_len())
                .execute()
                .await
                .map_err(classify);
            if let Err(err) = result {
                idempotent_add(err)?;
            }
        }
        Ok(())
    }

    async fn add_address(&self, name: &str, address: Ipv4Net) -> Result<(), LinkError> {
        let idx = self.index_of(name).await?;
        let result = self
            .handle
            .address()
            .add(idx, address.addr().into(), address.prefix_len())
            .execute()
            .await
            .map_err(classify);
        if let Err(err) = result {
            idempotent_add(err)?;
        }
        Ok(())
    }

    async fn remove_address(&self, name: &str, address: Ipv4Net) -> Result<(), LinkError> {
        let idx = match self.index_of(name).await {
            Ok(idx) => idx,
            Err(LinkError::NotFound(_)) => return Ok(()),
            Err(e) => return Err(e),
        };
        let mut addrs = self.handle.address().get().set_link_index_filter(idx).execute();
        while let Some(addr) = addrs.try_next().await.map_err(classify)? {
            let matches = addr
                .attributes
                .iter()
                .any(|attr| matches!(attr, netlink_packet_route::address::AddressAttribute::Address(a) if *a == address.addr()));
            if matches && addr.header.prefix_len == address.prefix_len() {
                let _ = self.handle.address().del(addr).execute().await;
            }
        }
        Ok(())
    }

    async fn enslave_vrf(&self, name: &str, vrf: &str) -> Result<(), LinkError> {
        let idx = self.index_of(name).await?;
        let vrf_idx = self.index_of(vrf).await?;
        self.handle.link().set(idx).controller(vrf_idx).execute().await.map_err(classify)
    }

    async fn set_mtu(&self, name: &str, mtu: u32) -> Result<(), LinkError> {
        let idx = self.index_of(name).await?;
        self.handle.link().set(idx).mtu(mtu).execute().await.map_err(classify)
    }

    async fn set_admin_state(&self, name: &str, up: bool) -> Result<(), LinkError> {
        let idx = self.index_of(name).await?;
        let set = self.handle.link().set(idx);
        let set = if up { set.up() } else { set.down() };
        set.execute().await.map_err(classify)
    }

    async fn set_hw_address(&self, name: &str, mac: MacAddr) -> Result<(), LinkError> {
        let idx = self.index_of(name).await?;
        self.handle.link().set(idx).address(mac.0.to_vec()).execute().await.map_err(classify)
    }
}

impl NetlinkLinkLayer {
    async fn query_addresses(&self, name: &str) -> Result<Vec<Ipv4Net>, LinkError> {
        let idx = match self.index_of(name).await {
            Ok(idx) => idx,
            Err(LinkError::NotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let mut stream = self.handle.address().get().set_link_index_filter(idx).execute();
        let mut out = Vec::new();
        while let Some(msg) = stream.try_next().await.map_err(classify)? {
            for attr in &msg.attributes {
                if let netlink_packet_route::address::AddressAttribute::Address(
                    std::net::IpAddr::V4(addr),
                ) = attr
                {
                    if let Ok(net) = Ipv4Net::new(*addr, msg.header.prefix_len) {
                        out.push(net);
                    }
                }
            }
        }
        Ok(out)
    }
}
