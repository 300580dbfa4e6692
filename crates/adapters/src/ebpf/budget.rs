// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Budget-gated feature enablement: each eBPF feature declares a cost and
//! a set of dependencies; the coordinator enables a feature only if its
//! cost, plus any not-yet-enabled dependency's cost, fits the remaining
//! budget.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;
use thiserror::Error;

use super::EbpfFeature;

/// Declared resource cost of running one feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureCost {
    pub cpu_percent: f32,
    pub memory_bytes: u64,
    pub events_per_sec: u32,
    pub packets_per_sec: u32,
}

impl FeatureCost {
    const fn new(cpu_percent: f32, memory_bytes: u64, events_per_sec: u32, packets_per_sec: u32) -> Self {
        Self { cpu_percent, memory_bytes, events_per_sec, packets_per_sec }
    }

    fn add(self, other: FeatureCost) -> FeatureCost {
        FeatureCost {
            cpu_percent: self.cpu_percent + other.cpu_percent,
            memory_bytes: self.memory_bytes + other.memory_bytes,
            events_per_sec: self.events_per_sec + other.events_per_sec,
            packets_per_sec: self.packets_per_sec + other.packets_per_sec,
        }
    }

    fn fits_within(&self, budget: &EbpfBudget) -> bool {
        self.cpu_percent <= budget.cpu_percent
            && self.memory_bytes <= budget.memory_bytes
            && self.events_per_sec <= budget.events_per_sec
            && self.packets_per_sec <= budget.packets_per_sec
    }
}

/// The resource ceiling features are enabled under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EbpfBudget {
    pub cpu_percent: f32,
    pub memory_bytes: u64,
    pub events_per_sec: u32,
    pub packets_per_sec: u32,
}

fn default_cost(feature: EbpfFeature) -> FeatureCost {
    match feature {
        EbpfFeature::XdpBlocklist => FeatureCost::new(2.0, 4 * 1024 * 1024, 1_000, 1_000_000),
        EbpfFeature::TcClassifier => FeatureCost::new(1.5, 2 * 1024 * 1024, 2_000, 500_000),
        EbpfFeature::SocketFilter => FeatureCost::new(1.0, 1 * 1024 * 1024, 500, 100_000),
        EbpfFeature::DnsBloom => FeatureCost::new(0.5, 512 * 1024, 200, 0),
    }
}

fn dependencies(feature: EbpfFeature) -> &'static [EbpfFeature] {
    match feature {
        EbpfFeature::XdpBlocklist => &[],
        EbpfFeature::TcClassifier => &[EbpfFeature::XdpBlocklist],
        EbpfFeature::SocketFilter => &[EbpfFeature::XdpBlocklist],
        EbpfFeature::DnsBloom => &[],
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum BudgetError {
    #[error("enabling {0:?} (and its dependencies) would exceed the configured budget")]
    Exceeded(EbpfFeature),
}

/// Tracks which features are enabled and rejects enabling one that would
/// push cumulative cost over the configured budget.
pub struct BudgetCoordinator {
    budget: EbpfBudget,
    costs: HashMap<EbpfFeature, FeatureCost>,
    enabled: Mutex<HashSet<EbpfFeature>>,
}

impl BudgetCoordinator {
    pub fn new(budget: EbpfBudget) -> Self {
        let costs = EbpfFeature::ALL.iter().map(|f| (*f, default_cost(*f))).collect();
        Self { budget, costs, enabled: Mutex::new(HashSet::new()) }
    }

    pub fn is_enabled(&self, feature: EbpfFeature) -> bool {
        self.enabled.lock().contains(&feature)
    }

    fn cumulative_cost(&self, enabled: &HashSet<EbpfFeature>) -> FeatureCost {
        enabled.iter().fold(FeatureCost::new(0.0, 0, 0, 0), |acc, f| acc.add(self.costs[f]))
    }

    /// Enables `feature`, transitively enabling any not-yet-enabled
    /// dependency first. Returns the set of features newly enabled by
    /// this call (in enablement order) or an error if the combined cost
    /// would exceed budget — in which case nothing changes.
    pub fn try_enable(&self, feature: EbpfFeature) -> Result<Vec<EbpfFeature>, BudgetError> {
        let mut enabled = self.enabled.lock();
        if enabled.contains(&feature) {
            return Ok(Vec::new());
        }

        let mut to_add = Vec::new();
        let mut candidate = enabled.clone();
        for dep in dependencies(feature) {
            if !candidate.contains(dep) {
                candidate.insert(*dep);
                to_add.push(*dep);
            }
        }
        candidate.insert(feature);
        to_add.push(feature);

        if !self.cumulative_cost(&candidate).fits_within(&self.budget) {
            return Err(BudgetError::Exceeded(feature));
        }

        *enabled = candidate;
        Ok(to_add)
    }

    /// Disables `feature` and cascades to anything that depends on it,
    /// since a dependent cannot run with its dependency gone.
    pub fn disable(&self, feature: EbpfFeature) -> Vec<EbpfFeature> {
        let mut enabled = self.enabled.lock();
        if !enabled.remove(&feature) {
            return Vec::new();
        }
        let mut removed = vec![feature];
        let mut gone: HashSet<EbpfFeature> = [feature].into_iter().collect();
        loop {
            let dependents: Vec<EbpfFeature> = enabled
                .iter()
                .copied()
                .filter(|f| dependencies(*f).iter().any(|d| gone.contains(d)))
                .collect();
            if dependents.is_empty() {
                break;
            }
            for dep in dependents {
                enabled.remove(&dep);
                gone.insert(dep);
                removed.push(dep);
            }
        }
        removed
    }
}

#[cfg(test)]
#[path = "budget_tests.rs"]
mod tests;
