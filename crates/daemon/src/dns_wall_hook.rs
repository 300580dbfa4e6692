// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adapts `ward_engine::dns_wall::DnsWall` into an [`ApplyHook`] so the
//! Config Manager's apply pipeline can re-sync dynamic DNS-authorized
//! ipsets immediately after the Network Reconciler's own packet-filter
//! apply step.
//!
//! The in-process resolver is an out-of-scope collaborator;
//! [`NullDnsAnswerSource`] stands in for it so `DnsWall` can still be
//! constructed and driven through `sync_firewall` even with nothing
//! actually resolving names yet.

use async_trait::async_trait;
use ward_adapters::PacketFilter;
use ward_core::{ApplyHook, Config, HookError};
use ward_engine::{DnsAnswer, DnsAnswerSource, DnsWall};

/// Stand-in for the real in-process resolver: never produces an answer
/// to stream, and has nothing cached to resync.
pub struct NullDnsAnswerSource;

#[async_trait]
impl DnsAnswerSource for NullDnsAnswerSource {
    async fn next_answer(&self) -> Option<DnsAnswer> {
        None
    }

    fn alive_cache(&self) -> Vec<DnsAnswer> {
        Vec::new()
    }
}

pub struct DnsWallHook<P: PacketFilter> {
    wall: DnsWall<NullDnsAnswerSource, P>,
}

impl<P: PacketFilter> DnsWallHook<P> {
    pub fn new(wall: DnsWall<NullDnsAnswerSource, P>) -> Self {
        Self { wall }
    }
}

#[async_trait]
impl<P: PacketFilter> ApplyHook for DnsWallHook<P> {
    fn name(&self) -> &'static str {
        "dns_wall"
    }

    /// Re-authorizes every DNS-derived ipset entry still believed alive,
    /// immediately after the Network Reconciler's packet-filter apply.
    async fn apply(&self, _running: &Config, _staged: &Config) -> Result<(), HookError> {
        self.wall.sync_firewall().await.map_err(|e| HookError::new(e.to_string()))
    }

    /// Dynamic ipset membership isn't part of the declarative config tree
    /// and doesn't roll back with it; a resync against the restored
    /// `running` config happens on the next successful apply instead.
    async fn rollback(&self, _running: &Config) -> Result<(), HookError> {
        Ok(())
    }
}
