// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Policies: ordered from-zone x to-zone rule groups.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal action of a policy default or a matching rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Accept,
    Drop,
    Reject,
}

/// Transport protocol match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
}

/// Either a single port or an inclusive range, as the HCL surface allows both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortSpec {
    Single(u16),
    Range(u16, u16),
}

impl PortSpec {
    pub fn contains(&self, port: u16) -> bool {
        match *self {
            PortSpec::Single(p) => p == port,
            PortSpec::Range(lo, hi) => (lo..=hi).contains(&port),
        }
    }
}

/// Endpoint match for `src`/`dest`: IP, CIDR, host, alias, named ipset, or
/// "member of this zone".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressMatch {
    Cidr(String),
    Host(String),
    Alias(String),
    IpSet(String),
    ZoneMember(String),
}

/// Local time-of-day, `HH:MM` 24h, as the HCL surface spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

impl TimeOfDay {
    pub const fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl std::str::FromStr for TimeOfDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, m) = s.split_once(':').ok_or_else(|| format!("invalid HH:MM: {s:?}"))?;
        let hour: u8 = h.parse().map_err(|_| format!("invalid hour in {s:?}"))?;
        let minute: u8 = m.parse().map_err(|_| format!("invalid minute in {s:?}"))?;
        if hour > 23 || minute > 59 {
            return Err(format!("time out of range: {s:?}"));
        }
        Ok(Self { hour, minute })
    }
}

/// Day of week, matching the HCL `days = [...]` surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// 0 = Monday .. 6 = Sunday, matching `jiff::civil::Weekday::to_monday_zero_offset`.
    pub const fn index(self) -> u8 {
        match self {
            Weekday::Monday => 0,
            Weekday::Tuesday => 1,
            Weekday::Wednesday => 2,
            Weekday::Thursday => 3,
            Weekday::Friday => 4,
            Weekday::Saturday => 5,
            Weekday::Sunday => 6,
        }
    }

    pub const fn from_index(i: u8) -> Self {
        match i % 7 {
            0 => Weekday::Monday,
            1 => Weekday::Tuesday,
            2 => Weekday::Wednesday,
            3 => Weekday::Thursday,
            4 => Weekday::Friday,
            5 => Weekday::Saturday,
            _ => Weekday::Sunday,
        }
    }

    pub const fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }
}

/// A single firewall rule inside a [`Policy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub action: Action,
    #[serde(default)]
    pub protocol: Option<Protocol>,
    #[serde(default)]
    pub src: Option<AddressMatch>,
    #[serde(default)]
    pub dest: Option<AddressMatch>,
    #[serde(default)]
    pub dest_port: Option<PortSpec>,
    #[serde(default)]
    pub time_start: Option<TimeOfDay>,
    #[serde(default)]
    pub time_end: Option<TimeOfDay>,
    #[serde(default)]
    pub days: Vec<Weekday>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub tcp_flags: Option<String>,
    #[serde(default)]
    pub max_connections: Option<u32>,
    #[serde(default)]
    pub disabled: bool,
}

impl Rule {
    pub fn new(name: impl Into<String>, action: Action) -> Self {
        Self {
            name: name.into(),
            action,
            protocol: None,
            src: None,
            dest: None,
            dest_port: None,
            time_start: None,
            time_end: None,
            days: Vec::new(),
            timezone: None,
            tcp_flags: None,
            max_connections: None,
            disabled: false,
        }
    }

    /// Whether this rule carries a time-window restriction at all.
    pub fn has_schedule(&self) -> bool {
        self.time_start.is_some() || self.time_end.is_some()
    }
}

/// An ordered `(from_zone, to_zone)` rule group with a default action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub from_zone: String,
    pub to_zone: String,
    pub default_action: Action,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl Policy {
    pub fn new(from_zone: impl Into<String>, to_zone: impl Into<String>, default_action: Action) -> Self {
        Self { from_zone: from_zone.into(), to_zone: to_zone.into(), default_action, rules: Vec::new() }
    }

    pub fn key(&self) -> (&str, &str) {
        (&self.from_zone, &self.to_zone)
    }

    pub fn key_owned(&self) -> (String, String) {
        (self.from_zone.clone(), self.to_zone.clone())
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
