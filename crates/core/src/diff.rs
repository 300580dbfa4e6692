// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structural diff between a running and a staged [`Config`]: the sole input
//! to the reconciler planner.

use crate::model::{Config, IpSet, Interface, Policy, VrfConfig, Zone};
use serde::{Deserialize, Serialize};

/// A single collection element's fate between `running` and `staged`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Change<T> {
    Added(T),
    Removed(T),
    /// Carries both sides so a hook can compute a minimal update rather than
    /// remove-then-add.
    Modified(T, T),
}

impl<T> Change<T> {
    pub fn is_removal(&self) -> bool {
        matches!(self, Change::Removed(_))
    }
}

fn diff_by_key<T, K, F>(running: &[T], staged: &[T], key: F) -> Vec<Change<T>>
where
    T: Clone + PartialEq,
    K: Eq + std::hash::Hash,
    F: Fn(&T) -> K,
{
    use std::collections::HashMap;

    let running_by_key: HashMap<K, &T> = running.iter().map(|item| (key(item), item)).collect();
    let staged_by_key: HashMap<K, &T> = staged.iter().map(|item| (key(item), item)).collect();

    let mut changes = Vec::new();

    for item in running {
        let k = key(item);
        match staged_by_key.get(&k) {
            None => changes.push(Change::Removed(item.clone())),
            Some(new_item) if *new_item != item => {
                changes.push(Change::Modified(item.clone(), (*new_item).clone()))
            }
            Some(_) => {}
        }
    }

    for item in staged {
        let k = key(item);
        if !running_by_key.contains_key(&k) {
            changes.push(Change::Added(item.clone()));
        }
    }

    changes
}

/// The ordered set of structural changes between two configuration trees.
///
/// Field order matches the reconciler's apply ordering: links before VRFs
/// before bonds/VLANs before addresses before packet-filter rules, so that a
/// consumer iterating fields in declaration order gets a dependency-safe
/// sequence for free.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigDiff {
    pub vrfs: Vec<Change<VrfConfig>>,
    pub interfaces: Vec<Change<Interface>>,
    pub zones: Vec<Change<Zone>>,
    pub ipsets: Vec<Change<IpSet>>,
    pub policies: Vec<Change<Policy>>,
    pub ip_forwarding_changed: bool,
    pub ipv6_forwarding_changed: bool,
}

impl ConfigDiff {
    pub fn is_empty(&self) -> bool {
        self.vrfs.is_empty()
            && self.interfaces.is_empty()
            && self.zones.is_empty()
            && self.ipsets.is_empty()
            && self.policies.is_empty()
            && !self.ip_forwarding_changed
            && !self.ipv6_forwarding_changed
    }
}

/// Compute the structural diff between `running` and `staged`.
///
/// This is a pure function: it never touches the kernel and never looks at
/// [`ConfigMeta`](crate::model::ConfigMeta). Identity for interfaces/zones is
/// `name`; for policies it's `(from_zone, to_zone)`; for VRFs it's `name`.
pub fn diff(running: &Config, staged: &Config) -> ConfigDiff {
    ConfigDiff {
        vrfs: diff_by_key(&running.vrfs, &staged.vrfs, |v| v.name.clone()),
        interfaces: diff_by_key(&running.interfaces, &staged.interfaces, |i| i.name.clone()),
        zones: diff_by_key(&running.zones, &staged.zones, |z| z.name.clone()),
        ipsets: diff_by_key(&running.ipsets, &staged.ipsets, |s| s.name.clone()),
        policies: diff_by_key(&running.policies, &staged.policies, |p| p.key_owned()),
        ip_forwarding_changed: running.ip_forwarding != staged.ip_forwarding,
        ipv6_forwarding_changed: running.ipv6_forwarding != staged.ipv6_forwarding,
    }
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;
