// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DNS Egress Authorizer, "DNS Wall": turns resolved names into
//! short-lived firewall allowances, so a zone can reach only hosts its
//! clients actually looked up.
//!
//! A background task drains the answer source, handed off with its own
//! `JoinHandle` the caller can abort on shutdown.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};
use ward_adapters::{PacketFilter, PacketFilterError};
use ward_core::DnsConfig;

/// DNS record type the authorizer acts on; spec only names A/AAAA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    A,
    Aaaa,
}

/// One forwarded DNS answer, as handed off by the in-process resolver.
///
/// Only answers returned to a client for a name the resolver actually
/// forwarded upstream are eligible — locally synthesized records (e.g.
/// a configured static override) never reach this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsAnswer {
    pub name: String,
    pub rtype: RecordType,
    pub addr: IpAddr,
    pub ttl: u32,
}

/// The in-process resolver collaborator. `ward` only specifies this
/// consumption interface; the resolver implementation itself is out of
/// scope.
#[async_trait]
pub trait DnsAnswerSource: Send + Sync {
    /// Awaits the next forwarded answer; `None` signals the source is
    /// shutting down.
    async fn next_answer(&self) -> Option<DnsAnswer>;

    /// Every answer still believed live, for `SyncFirewall` to
    /// re-authorize after a ruleset swap.
    fn alive_cache(&self) -> Vec<DnsAnswer>;
}

fn ttl_effective(cfg: &DnsConfig, record_ttl: u32) -> Duration {
    let ttl = if cfg.override_ttl_secs == 0 { record_ttl } else { cfg.override_ttl_secs.max(record_ttl) };
    Duration::from_secs(ttl as u64)
}

/// Authorizes resolved IPs into `cfg.egress_set` with a TTL bound to the
/// record. A no-op wherever `cfg.egress_filtering` is disabled.
pub struct DnsWall<S: DnsAnswerSource, P: PacketFilter> {
    source: S,
    packet_filter: std::sync::Arc<P>,
    cfg: DnsConfig,
}

impl<S: DnsAnswerSource, P: PacketFilter> DnsWall<S, P> {
    pub fn new(source: S, packet_filter: std::sync::Arc<P>, cfg: DnsConfig) -> Self {
        Self { source, packet_filter, cfg }
    }

    /// Drains `source` until it closes, authorizing each answer. Each
    /// `AuthorizeIP` call is fired as a detached task so a slow
    /// packet-filter round trip never delays resolution; failures are
    /// logged and dropped, never surfaced to the resolver.
    pub async fn run(&self) {
        if !self.cfg.egress_filtering {
            return;
        }
        while let Some(answer) = self.source.next_answer().await {
            if !matches!(answer.rtype, RecordType::A | RecordType::Aaaa) {
                continue;
            }
            self.authorize_detached(answer);
        }
    }

    fn authorize_detached(&self, answer: DnsAnswer) {
        let ttl = ttl_effective(&self.cfg, answer.ttl);
        let set = self.cfg.egress_set.clone();
        let packet_filter = std::sync::Arc::clone(&self.packet_filter);
        tokio::spawn(async move {
            if let Err(err) = packet_filter.authorize_ip(&set, answer.addr, ttl).await {
                warn!(name = %answer.name, addr = %answer.addr, %err, "dns wall authorization failed, dropped");
            } else {
                debug!(name = %answer.name, addr = %answer.addr, ttl_secs = ttl.as_secs(), "dns wall authorized");
            }
        });
    }

    /// Re-authorizes every still-alive cached answer. Called right after
    /// the Packet-Filter Layer's `Apply` so dynamic allowances survive a
    /// ruleset swap.
    pub async fn sync_firewall(&self) -> Result<(), PacketFilterError> {
        if !self.cfg.egress_filtering {
            return Ok(());
        }
        for answer in self.source.alive_cache() {
            let ttl = ttl_effective(&self.cfg, answer.ttl);
            self.packet_filter.authorize_ip(&self.cfg.egress_set, answer.addr, ttl).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "dns_wall_tests.rs"]
mod tests;
