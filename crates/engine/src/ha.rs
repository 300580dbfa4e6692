// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HA Service: active/passive failover between two nodes, migrating
//! Virtual MACs/IPs and conntrack state on takeover.
//!
//! Each transition is its own method that validates, mutates, and logs,
//! rather than a single generic `transition()` dispatcher.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use tracing::{info, warn};
use ward_adapters::{derive_virtual_mac, DhcpError, DhcpReclaimer, LinkError, LinkLayer};
use ward_core::{Clock, HaConfig, MacAddr, VirtualResource, WardError};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum HaError {
    #[error("heartbeat signature invalid")]
    SignatureInvalid,

    #[error("heartbeat encoding failed: {0}")]
    Encode(String),

    #[error(transparent)]
    Link(#[from] LinkError),

    #[error(transparent)]
    Dhcp(#[from] DhcpError),

    #[error("conntrack sync failed: {0}")]
    Conntrack(String),

    #[error("takeover failed: {0}")]
    TakeoverFailed(String),

    #[error("split-brain: {0}")]
    SplitBrain(String),
}

impl From<HaError> for WardError {
    fn from(err: HaError) -> Self {
        match err {
            HaError::SplitBrain(msg) => WardError::SplitBrain(msg),
            HaError::TakeoverFailed(msg) => WardError::TakeoverFailed(msg),
            other => WardError::StateInconsistent(other.to_string()),
        }
    }
}

/// HA Service operating state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaState {
    Primary,
    Backup,
    TakingOver,
    Failed,
}

/// The role a node advertises in its heartbeat; unlike [`HaState`], a
/// node never broadcasts `TakingOver` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HaRole {
    Primary,
    Backup,
}

/// The signed fields of a heartbeat, in the fixed order the signature
/// covers. Never includes the signature itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignablePayload {
    pub node_id: String,
    pub role: HaRole,
    pub priority: u32,
    pub state_version: u64,
    pub timestamp: u64,
}

/// Heartbeat wire format, JSON-equivalent over UDP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Heartbeat {
    #[serde(flatten)]
    pub payload: SignablePayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Vec<u8>>,
}

/// HMAC-SHA256 over the canonical encoding of `payload`, never the
/// signature field itself.
pub fn sign(secret: &[u8], payload: &SignablePayload) -> Result<Vec<u8>, HaError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| HaError::SignatureInvalid)?;
    mac.update(&canonical_bytes(payload)?);
    Ok(mac.finalize().into_bytes().to_vec())
}

pub fn verify(secret: &[u8], payload: &SignablePayload, signature: &[u8]) -> Result<bool, HaError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| HaError::SignatureInvalid)?;
    mac.update(&canonical_bytes(payload)?);
    Ok(mac.verify_slice(signature).is_ok())
}

fn canonical_bytes(payload: &SignablePayload) -> Result<Vec<u8>, HaError> {
    serde_json::to_vec(payload).map_err(|err| HaError::Encode(err.to_string()))
}

/// Config for the external conntrack-sync daemon this node should run.
#[derive(Debug, Clone)]
pub enum ConntrackSyncMode {
    Unicast { peer: IpAddr },
    Multicast { group: IpAddr },
}

#[derive(Debug, Clone)]
pub struct ConntrackSyncConfig {
    pub mode: ConntrackSyncMode,
    pub port: u16,
}

/// Thin wrapper around an external conntrack-sync daemon: the HA service
/// only needs to start/stop it and request a commit of its externally
/// synced cache into the kernel conntrack table on failover.
#[async_trait]
pub trait ConntrackSync: Send + Sync {
    async fn start(&self, cfg: &ConntrackSyncConfig) -> Result<(), HaError>;
    async fn stop(&self) -> Result<(), HaError>;
    async fn commit(&self) -> Result<(), HaError>;
}

/// Records calls instead of driving a real daemon; used on platforms
/// with no conntrack-sync binary available and in tests.
#[derive(Default)]
pub struct StubConntrackSync {
    calls: Mutex<Vec<&'static str>>,
}

impl StubConntrackSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ConntrackSync for StubConntrackSync {
    async fn start(&self, _cfg: &ConntrackSyncConfig) -> Result<(), HaError> {
        self.calls.lock().push("start");
        Ok(())
    }

    async fn stop(&self) -> Result<(), HaError> {
        self.calls.lock().push("stop");
        Ok(())
    }

    async fn commit(&self) -> Result<(), HaError> {
        self.calls.lock().push("commit");
        Ok(())
    }
}

/// Invoked once a failover completes and this node has become Primary.
pub trait BecomePrimaryHook: Send + Sync {
    fn on_become_primary(&self);
}

/// Drives the HA state machine: heartbeat accounting, split-brain
/// resolution by priority, and the five-step failover sequence.
pub struct HaService<L: LinkLayer, D: DhcpReclaimer, S: ConntrackSync, C: Clock> {
    cfg: HaConfig,
    link: Arc<L>,
    dhcp: Arc<D>,
    conntrack: Arc<S>,
    clock: C,
    state: Mutex<HaState>,
    missed_heartbeats: Mutex<u32>,
    state_version: Mutex<u64>,
    original_macs: Mutex<HashMap<String, MacAddr>>,
    on_become_primary: Option<Arc<dyn BecomePrimaryHook>>,
}

impl<L: LinkLayer, D: DhcpReclaimer, S: ConntrackSync, C: Clock> HaService<L, D, S, C> {
    pub fn new(
        cfg: HaConfig,
        link: Arc<L>,
        dhcp: Arc<D>,
        conntrack: Arc<S>,
        clock: C,
        on_become_primary: Option<Arc<dyn BecomePrimaryHook>>,
    ) -> Self {
        let initial = match cfg.mode {
            ward_core::HaMode::Primary => HaState::Primary,
            ward_core::HaMode::Backup | ward_core::HaMode::Disabled => HaState::Backup,
        };
        Self {
            cfg,
            link,
            dhcp,
            conntrack,
            clock,
            state: Mutex::new(initial),
            missed_heartbeats: Mutex::new(0),
            state_version: Mutex::new(0),
            original_macs: Mutex::new(HashMap::new()),
            on_become_primary,
        }
    }

    pub fn state(&self) -> HaState {
        *self.state.lock()
    }

    /// Starts the external conntrack-sync daemon with a config derived
    /// from the configured peers: unicast to the sole peer when there is
    /// exactly one, multicast otherwise needs an operator-supplied group
    /// and is out of scope here — callers with more than one peer must
    /// build their own [`ConntrackSyncConfig`] and call
    /// `conntrack().start` directly.
    pub async fn start_conntrack_sync(&self) -> Result<(), HaError> {
        let Some(&peer) = self.cfg.peers.first() else {
            return Ok(());
        };
        let cfg = ConntrackSyncConfig { mode: ConntrackSyncMode::Unicast { peer }, port: self.cfg.heartbeat_port };
        self.conntrack.start(&cfg).await
    }

    pub async fn stop_conntrack_sync(&self) -> Result<(), HaError> {
        self.conntrack.stop().await
    }

    fn role(&self) -> HaRole {
        match self.state() {
            HaState::Primary => HaRole::Primary,
            _ => HaRole::Backup,
        }
    }

    /// Builds and, if a shared secret is configured, signs this node's
    /// current heartbeat.
    pub fn build_heartbeat(&self) -> Result<Heartbeat, HaError> {
        let payload = SignablePayload {
            node_id: self.cfg.node_id.clone(),
            role: self.role(),
            priority: self.cfg.priority,
            state_version: *self.state_version.lock(),
            timestamp: self.clock.epoch_ms(),
        };
        let signature = match &self.cfg.shared_secret {
            Some(secret) => Some(sign(secret.as_bytes(), &payload)?),
            None => None,
        };
        Ok(Heartbeat { payload, signature })
    }

    /// Processes a heartbeat received from a peer: verifies its
    /// signature when a shared secret is configured, resolves
    /// split-brain if both nodes claim Primary, and otherwise resets the
    /// missed-heartbeat counter.
    pub async fn handle_received(&self, hb: &Heartbeat) -> Result<(), HaError> {
        if let Some(secret) = &self.cfg.shared_secret {
            let signature = hb.signature.as_deref().ok_or(HaError::SignatureInvalid)?;
            if !verify(secret.as_bytes(), &hb.payload, signature)? {
                return Err(HaError::SignatureInvalid);
            }
        }

        if hb.payload.node_id == self.cfg.node_id {
            return Ok(());
        }

        if self.state() == HaState::Primary && hb.payload.role == HaRole::Primary {
            if self.cfg.priority > hb.payload.priority {
                warn!(peer = %hb.payload.node_id, "split-brain: we have higher priority, demoting");
                return self.demote().await;
            }
            info!(peer = %hb.payload.node_id, "split-brain: peer has higher priority, holding Primary");
            return Ok(());
        }

        *self.missed_heartbeats.lock() = 0;
        Ok(())
    }

    /// Called once per `heartbeat_interval` tick; counts a missed
    /// heartbeat and triggers failover once `failure_threshold` is
    /// reached.
    pub async fn tick(&self) -> Result<(), HaError> {
        if self.state() != HaState::Backup {
            return Ok(());
        }
        let missed = {
            let mut missed = self.missed_heartbeats.lock();
            *missed += 1;
            *missed
        };
        if missed >= self.cfg.failure_threshold {
            self.failover().await?;
        }
        Ok(())
    }

    /// Backup → TakingOver → Primary failover sequence.
    pub async fn failover(&self) -> Result<(), HaError> {
        *self.state.lock() = HaState::TakingOver;
        if let Err(err) = self.run_failover_steps().await {
            *self.state.lock() = HaState::Failed;
            return Err(HaError::TakeoverFailed(err.to_string()));
        }
        *self.state.lock() = HaState::Primary;
        *self.missed_heartbeats.lock() = 0;
        if let Some(hook) = &self.on_become_primary {
            hook.on_become_primary();
        }
        Ok(())
    }

    async fn run_failover_steps(&self) -> Result<(), HaError> {
        self.apply_virtual_macs().await?;
        self.apply_virtual_ips().await?;
        *self.state_version.lock() += 1;
        self.conntrack.commit().await?;
        Ok(())
    }

    async fn apply_virtual_macs(&self) -> Result<(), HaError> {
        for resource in &self.cfg.virtual_resources {
            let VirtualResource::VirtualMac(vm) = resource else { continue };
            let mac = vm.address.unwrap_or_else(|| derive_virtual_mac(&vm.interface));

            let current = self.link.query(&vm.interface).await?;
            if let Some(original) = current.mac {
                self.original_macs.lock().entry(vm.interface.clone()).or_insert(original);
            }

            self.link.set_hw_address(&vm.interface, mac).await?;
            if vm.dhcp {
                self.dhcp.reclaim_lease(&vm.interface, mac).await?;
            }
        }
        Ok(())
    }

    async fn apply_virtual_ips(&self) -> Result<(), HaError> {
        for resource in &self.cfg.virtual_resources {
            let VirtualResource::VirtualIp(vip) = resource else { continue };
            match vip.address {
                ipnet::IpNet::V4(net) => self.link.add_address(&vip.interface, net).await?,
                ipnet::IpNet::V6(_) => {
                    warn!(interface = %vip.interface, "ipv6 virtual ip unsupported, skipped");
                }
            }
        }
        Ok(())
    }

    /// Primary → Backup on split-brain: drops Virtual IPs and restores
    /// each interface's pre-failover hardware address.
    ///
    /// MAC restoration on demotion is automatic, not operator-driven,
    /// using the address captured the moment the Virtual MAC was first
    /// applied (see DESIGN.md).
    async fn demote(&self) -> Result<(), HaError> {
        for resource in &self.cfg.virtual_resources {
            if let VirtualResource::VirtualIp(vip) = resource {
                if let ipnet::IpNet::V4(net) = vip.address {
                    self.link.remove_address(&vip.interface, net).await?;
                }
            }
        }

        let originals: Vec<(String, MacAddr)> = self.original_macs.lock().drain().collect();
        for (interface, mac) in originals {
            self.link.set_hw_address(&interface, mac).await?;
        }

        *self.state.lock() = HaState::Backup;
        Ok(())
    }

    /// Sends this node's current heartbeat to every configured peer.
    pub async fn send_heartbeat(&self, socket: &tokio::net::UdpSocket) -> Result<(), HaError> {
        let hb = self.build_heartbeat()?;
        let bytes = serde_json::to_vec(&hb).map_err(|err| HaError::Encode(err.to_string()))?;
        for peer in &self.cfg.peers {
            let addr = SocketAddr::new(*peer, self.cfg.heartbeat_port);
            if let Err(err) = socket.send_to(&bytes, addr).await {
                warn!(%peer, %err, "failed to send heartbeat");
            }
        }
        Ok(())
    }

    /// Receives and processes one heartbeat datagram. Malformed packets
    /// and rejected signatures are logged and dropped rather than
    /// surfaced to the caller — a single bad datagram must never take
    /// down the heartbeat loop.
    pub async fn recv_heartbeat(&self, socket: &tokio::net::UdpSocket) {
        let mut buf = [0u8; 1024];
        let (n, _from) = match socket.recv_from(&mut buf).await {
            Ok(pair) => pair,
            Err(err) => {
                warn!(%err, "heartbeat socket recv failed");
                return;
            }
        };
        let hb: Heartbeat = match serde_json::from_slice(&buf[..n]) {
            Ok(hb) => hb,
            Err(err) => {
                warn!(%err, "malformed heartbeat datagram, dropped");
                return;
            }
        };
        if let Err(err) = self.handle_received(&hb).await {
            warn!(%err, "heartbeat rejected");
        }
    }
}

#[cfg(test)]
#[path = "ha_tests.rs"]
mod tests;
