// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rule compilation: turns the declarative `Policy`/`Rule` tree into a
//! kernel-agnostic intermediate form. Both [`super::nft`] and
//! [`super::stub`] consume [`CompiledRuleset`] so the compiler itself
//! never depends on a specific firewall backend.

use ward_core::{
    compile_window, Action, AddressMatch, HourRange, PortSpec, Protocol, Rule, TimeOfDay, Weekday,
};
use ward_core::Policy;

use super::PacketFilterError;

/// A rule after schedule/default resolution, in first-match-wins order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRule {
    pub name: String,
    pub action: Action,
    pub protocol: Option<Protocol>,
    pub src: Option<AddressMatch>,
    pub dest: Option<AddressMatch>,
    pub dest_port: Option<PortSpec>,
    /// UTC `(weekday, hour-range)` windows the rule is active in; empty
    /// means "always" (no `time_start`/`time_end` configured).
    pub schedule: Vec<(Weekday, HourRange)>,
    pub tcp_flags: Option<String>,
    pub max_connections: Option<u32>,
    pub counter_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPolicy {
    pub from_zone: String,
    pub to_zone: String,
    pub default_action: Action,
    pub rules: Vec<CompiledRule>,
    pub counter_name: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledRuleset {
    pub policies: Vec<CompiledPolicy>,
}

fn counter_name(from_zone: &str, to_zone: &str, rule_name: Option<&str>) -> String {
    match rule_name {
        Some(name) => format!("policy_{from_zone}_{to_zone}_rule_{name}"),
        None => format!("policy_{from_zone}_{to_zone}"),
    }
}

fn compile_rule(policy: &Policy, rule: &Rule) -> Result<CompiledRule, PacketFilterError> {
    let schedule = if rule.has_schedule() {
        let start = rule.time_start.unwrap_or(TimeOfDay::new(0, 0));
        let end = rule.time_end.unwrap_or(TimeOfDay::new(0, 0));
        let tz = rule.timezone.as_deref().unwrap_or("UTC");
        compile_window(start, end, &rule.days, tz)
            .map_err(|e| PacketFilterError::Compile(e.to_string()))?
    } else {
        Vec::new()
    };

    Ok(CompiledRule {
        name: rule.name.clone(),
        action: rule.action,
        protocol: rule.protocol,
        src: rule.src.clone(),
        dest: rule.dest.clone(),
        dest_port: rule.dest_port,
        schedule,
        tcp_flags: rule.tcp_flags.clone(),
        max_connections: rule.max_connections,
        counter_name: counter_name(&policy.from_zone, &policy.to_zone, Some(&rule.name)),
    })
}

/// Compile one `Policy` block. Rules within it keep declaration order —
/// first-match-wins is the compiled-ruleset's traversal order, not
/// something resolved here.
pub fn compile_policy(policy: &Policy) -> Result<CompiledPolicy, PacketFilterError> {
    let rules = policy
        .rules
        .iter()
        .filter(|r| !r.disabled)
        .map(|r| compile_rule(policy, r))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CompiledPolicy {
        from_zone: policy.from_zone.clone(),
        to_zone: policy.to_zone.clone(),
        default_action: policy.default_action,
        rules,
        counter_name: counter_name(&policy.from_zone, &policy.to_zone, None),
    })
}

pub fn compile_ruleset(policies: &[Policy]) -> Result<CompiledRuleset, PacketFilterError> {
    let policies = policies.iter().map(compile_policy).collect::<Result<Vec<_>, _>>()?;
    Ok(CompiledRuleset { policies })
}

#[cfg(test)]
#[path = "compile_tests.rs"]
mod tests;
