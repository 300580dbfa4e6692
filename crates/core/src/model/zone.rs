// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Zones: logical groupings of interfaces/addresses used as policy endpoints.

use ipnet::IpNet;
use serde::{Deserialize, Serialize};

/// One match predicate inside a `zone` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneMatch {
    Interface(String),
    SourceCidr(IpNet),
}

/// `management { web_ui, ssh, ... }` block on a [`Zone`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneManagement {
    #[serde(default)]
    pub web_ui: bool,
    #[serde(default)]
    pub ssh: bool,
}

/// A logical grouping of interfaces/addresses used as the subject/object of policies.
///
/// `name` is the unique key. An interface belongs to at most one zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    #[serde(default)]
    pub matches: Vec<ZoneMatch>,
    #[serde(default)]
    pub management: Option<ZoneManagement>,
}

impl Zone {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), matches: Vec::new(), management: None }
    }

    /// Interface names referenced by an `Interface(..)` match predicate.
    pub fn interface_matches(&self) -> impl Iterator<Item = &str> {
        self.matches.iter().filter_map(|m| match m {
            ZoneMatch::Interface(name) => Some(name.as_str()),
            ZoneMatch::SourceCidr(_) => None,
        })
    }
}

#[cfg(test)]
#[path = "zone_tests.rs"]
mod tests;
