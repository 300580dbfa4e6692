// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Non-Linux / test [`EbpfBridge`]: in-memory maps, no real program
//! loading. `attach`/`detach` still go through [`BudgetCoordinator`] so
//! budget-rejection behavior is testable without a kernel.

use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::budget::{BudgetCoordinator, EbpfBudget};
use super::{EbpfBridge, EbpfError, EbpfFeature, FlowKey, Verdict};

pub struct StubEbpfBridge {
    budget: BudgetCoordinator,
    blocklist: Mutex<HashMap<Ipv4Addr, u64>>,
    bloom: Mutex<HashSet<String>>,
    flows: Mutex<HashMap<FlowKey, Verdict>>,
}

impl StubEbpfBridge {
    pub fn new(budget: EbpfBudget) -> Self {
        Self {
            budget: BudgetCoordinator::new(budget),
            blocklist: Mutex::new(HashMap::new()),
            bloom: Mutex::new(HashSet::new()),
            flows: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_blocklisted(&self, ip: Ipv4Addr) -> bool {
        self.blocklist.lock().contains_key(&ip)
    }

    pub fn bloom_contains(&self, domain: &str) -> bool {
        self.bloom.lock().contains(domain)
    }

    /// Seeds a canned verdict for a flow, simulating what a real
    /// conntrack-backed flow map would already know at startup.
    pub fn seed_flow(&self, flow: FlowKey, verdict: Verdict) {
        self.flows.lock().insert(flow, verdict);
    }
}

#[async_trait]
impl EbpfBridge for StubEbpfBridge {
    async fn attach(&self, feature: EbpfFeature) -> Result<(), EbpfError> {
        self.budget.try_enable(feature).map_err(|e| EbpfError::LoadFailed(e.to_string()))?;
        Ok(())
    }

    async fn detach(&self, feature: EbpfFeature) -> Result<(), EbpfError> {
        self.budget.disable(feature);
        Ok(())
    }

    async fn update_blocklist(&self, ip: Ipv4Addr, unix_nanos: u64) -> Result<(), EbpfError> {
        if !self.budget.is_enabled(EbpfFeature::XdpBlocklist) {
            return Err(EbpfError::NotAttached(EbpfFeature::XdpBlocklist));
        }
        self.blocklist.lock().insert(ip, unix_nanos);
        Ok(())
    }

    async fn update_bloom(&self, domain: &str) -> Result<(), EbpfError> {
        if !self.budget.is_enabled(EbpfFeature::DnsBloom) {
            return Err(EbpfError::NotAttached(EbpfFeature::DnsBloom));
        }
        self.bloom.lock().insert(domain.to_string());
        Ok(())
    }

    async fn seed_flows_from_conntrack(&self) -> Result<(), EbpfError> {
        Ok(())
    }

    async fn verdict(&self, flow: &FlowKey) -> Verdict {
        self.flows.lock().get(flow).copied().unwrap_or(Verdict::Accept)
    }
}

#[cfg(test)]
#[path = "stub_tests.rs"]
mod tests;
