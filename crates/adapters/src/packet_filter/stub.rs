// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Non-Linux / test [`PacketFilter`]: an in-memory mirror of the same
//! trait, also used to back the `DryRun` renderer (nothing here ever
//! touches a kernel).

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use ward_core::{Clock, IpSet, Policy, SystemClock};

use super::compile::{compile_ruleset, CompiledRuleset};
use super::{IpSetMember, PacketFilter, PacketFilterError};

#[derive(Default)]
struct SetState {
    definition: Option<IpSet>,
    dynamic: HashMap<IpAddr, Instant>,
}

/// In-memory [`PacketFilter`], generic over [`Clock`] so TTL expiry can
/// be driven by a [`ward_core::FakeClock`] in tests.
pub struct StubPacketFilter<C: Clock = SystemClock> {
    clock: C,
    applied: Mutex<CompiledRuleset>,
    sets: Mutex<HashMap<String, SetState>>,
}

impl StubPacketFilter<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> StubPacketFilter<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock, applied: Mutex::new(CompiledRuleset::default()), sets: Mutex::new(HashMap::new()) }
    }

    pub fn applied_ruleset(&self) -> CompiledRuleset {
        self.applied.lock().clone()
    }
}

impl<C: Clock> Default for StubPacketFilter<C>
where
    C: Default,
{
    fn default() -> Self {
        Self::with_clock(C::default())
    }
}

#[async_trait]
impl<C: Clock> PacketFilter for StubPacketFilter<C> {
    async fn apply(&self, policies: &[Policy], ipsets: &[IpSet]) -> Result<(), PacketFilterError> {
        let compiled = compile_ruleset(policies)?;
        *self.applied.lock() = compiled;

        let mut sets = self.sets.lock();
        for ipset in ipsets {
            let entry = sets.entry(ipset.name.clone()).or_default();
            entry.definition = Some(ipset.clone());
        }
        Ok(())
    }

    async fn authorize_ip(
        &self,
        set: &str,
        ip: IpAddr,
        ttl: Duration,
    ) -> Result<(), PacketFilterError> {
        let mut sets = self.sets.lock();
        let entry = sets.entry(set.to_string()).or_default();
        entry.dynamic.insert(ip, self.clock.now() + ttl);
        Ok(())
    }

    async fn revoke_ip(&self, set: &str, ip: IpAddr) -> Result<(), PacketFilterError> {
        if let Some(entry) = self.sets.lock().get_mut(set) {
            entry.dynamic.remove(&ip);
        }
        Ok(())
    }

    async fn list_ipset(&self, set: &str) -> Result<Vec<IpSetMember>, PacketFilterError> {
        let mut sets = self.sets.lock();
        let entry = sets.get_mut(set).ok_or_else(|| PacketFilterError::UnknownSet(set.to_string()))?;
        let now = self.clock.now();
        entry.dynamic.retain(|_, expires_at| *expires_at > now);
        Ok(entry
            .dynamic
            .iter()
            .map(|(address, expires_at)| IpSetMember { address: *address, expires_at: Some(*expires_at) })
            .collect())
    }

    async fn check_ipset(&self, set: &str, ip: IpAddr) -> Result<bool, PacketFilterError> {
        let mut sets = self.sets.lock();
        let entry = sets.entry(set.to_string()).or_default();
        let now = self.clock.now();
        entry.dynamic.retain(|_, expires_at| *expires_at > now);
        if entry.dynamic.contains_key(&ip) {
            return Ok(true);
        }
        Ok(entry.definition.as_ref().is_some_and(|def| def.contains_static(ip)))
    }
}

#[cfg(test)]
#[path = "stub_tests.rs"]
mod tests;
