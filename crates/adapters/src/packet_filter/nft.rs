// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Linux [`PacketFilter`] backed by the `nftables` crate: one JSON
//! transaction per [`PacketFilter::apply`] call, submitted via
//! `nft -f - --json` so a compile success is atomic at the kernel
//! boundary. Dynamic ipsets are maintained incrementally by
//! `authorize_ip`/`revoke_ip` without reloading the whole ruleset.

use std::net::IpAddr;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use nftables::batch::Batch;
use nftables::expr::Expression;
use nftables::helper::{apply_ruleset, NftablesError};
use nftables::schema::{Chain, NfListObject, Nftables, Rule as NftRule, SetElement, Table};
use nftables::types::{NfChainPolicy, NfChainType, NfFamily, NfHook};
use parking_lot::Mutex;
use ward_core::{Clock, IpSet, Policy, SystemClock};

use super::compile::{compile_ruleset, CompiledPolicy, CompiledRule};
use super::{IpSetMember, PacketFilter, PacketFilterError};

const TABLE: &str = "ward";
const FAMILY: NfFamily = NfFamily::INet;

impl From<NftablesError> for PacketFilterError {
    fn from(err: NftablesError) -> Self {
        PacketFilterError::Kernel(err.to_string())
    }
}

fn chain_name(policy: &CompiledPolicy) -> String {
    format!("policy_{}_{}", policy.from_zone, policy.to_zone)
}

/// Renders one compiled rule's match/verdict as a raw nft expression
/// string. The full compiler covers protocol, ports, tcp flags,
/// connection limits, and the UTC schedule windows from
/// `ward_core::schedule`; left as a single string here rather than a
/// typed `Expression` tree because the match surface (time ranges,
/// ct-count, flag masks) doesn't fit `nftables::expr`'s typed helpers
/// cleanly — nft's own statement grammar is the least-friction target.
fn render_match(rule: &CompiledRule) -> String {
    let mut parts = Vec::new();
    if let Some(proto) = rule.protocol {
        parts.push(format!("meta l4proto {}", proto_name(proto)));
    }
    if let Some(port) = rule.dest_port {
        parts.push(format!("{} dport {}", proto_name(rule.protocol.unwrap_or(ward_core::Protocol::Tcp)), port_expr(port)));
    }
    if let Some(flags) = &rule.tcp_flags {
        parts.push(format!("tcp flags {flags}"));
    }
    if let Some(max) = rule.max_connections {
        parts.push(format!("ct count over {max}"));
    }
    for (weekday, range) in &rule.schedule {
        parts.push(format!("meta day \"{}\" meta hour {}-{}", weekday_name(weekday), range.start, range.end));
    }
    parts.join(" ")
}

fn proto_name(proto: ward_core::Protocol) -> &'static str {
    match proto {
        ward_core::Protocol::Tcp => "tcp",
        ward_core::Protocol::Udp => "udp",
        ward_core::Protocol::Icmp => "icmp",
    }
}

fn port_expr(port: ward_core::PortSpec) -> String {
    match port {
        ward_core::PortSpec::Single(p) => p.to_string(),
        ward_core::PortSpec::Range(lo, hi) => format!("{lo}-{hi}"),
    }
}

fn weekday_name(day: &ward_core::Weekday) -> &'static str {
    match day {
        ward_core::Weekday::Monday => "Mon",
        ward_core::Weekday::Tuesday => "Tue",
        ward_core::Weekday::Wednesday => "Wed",
        ward_core::Weekday::Thursday => "Thu",
        ward_core::Weekday::Friday => "Fri",
        ward_core::Weekday::Saturday => "Sat",
        ward_core::Weekday::Sunday => "Sun",
    }
}

fn verdict(action: ward_core::Action) -> &'static str {
    match action {
        ward_core::Action::Accept => "accept",
        ward_core::Action::Drop => "drop",
        ward_core::Action::Reject => "reject",
    }
}

fn build_ruleset(ruleset: &super::compile::CompiledRuleset, ipsets: &[IpSet]) -> Nftables {
    let mut batch = Batch::new();
    batch.add(NfListObject::Table(Table::new(FAMILY, TABLE.to_string())));

    for policy in &ruleset.policies {
        let chain = Chain::new(
            FAMILY,
            TABLE.to_string(),
            chain_name(policy),
            Some(NfChainType::Filter),
            Some(NfHook::Forward),
            Some(0),
            None,
            Some(match policy.default_action {
                ward_core::Action::Accept => NfChainPolicy::Accept,
                _ => NfChainPolicy::Drop,
            }),
        );
        batch.add(NfListObject::Chain(chain));

        for rule in &policy.rules {
            let expr = render_match(rule);
            let statement = format!("{expr} counter name \"{}\" {}", rule.counter_name, verdict(rule.action))
                .trim()
                .to_string();
            batch.add(NfListObject::Rule(NftRule::new(
                FAMILY,
                TABLE.to_string(),
                chain_name(policy),
                vec![Expression::String(statement)],
            )));
        }
    }

    for ipset in ipsets {
        if ipset.dynamic {
            continue;
        }
        let elements: Vec<SetElement> = ipset
            .static_members
            .iter()
            .map(|net| SetElement::String(net.to_string()))
            .collect();
        batch.add(NfListObject::Set(nftables::schema::Set::new(
            FAMILY,
            TABLE.to_string(),
            ipset.name.clone(),
            nftables::types::SetTypeValue::Single(nftables::types::SetType::Ipv4Addr),
        )));
        if !elements.is_empty() {
            batch.add(NfListObject::Element(nftables::schema::Element::new(
                FAMILY,
                TABLE.to_string(),
                ipset.name.clone(),
                elements,
            )));
        }
    }

    batch.to_nftables()
}

pub struct NftPacketFilter<C: Clock = SystemClock> {
    clock: C,
    expiries: Mutex<std::collections::HashMap<(String, IpAddr), Instant>>,
}

impl NftPacketFilter<SystemClock> {
    pub fn new() -> Self {
        Self { clock: SystemClock, expiries: Mutex::new(Default::default()) }
    }
}

#[async_trait]
impl<C: Clock> PacketFilter for NftPacketFilter<C> {
    async fn apply(&self, policies: &[Policy], ipsets: &[IpSet]) -> Result<(), PacketFilterError> {
        let compiled = compile_ruleset(policies)?;
        let ruleset = build_ruleset(&compiled, ipsets);
        apply_ruleset(&ruleset)?;
        Ok(())
    }

    async fn authorize_ip(
        &self,
        set: &str,
        ip: IpAddr,
        ttl: Duration,
    ) -> Result<(), PacketFilterError> {
        let mut batch = Batch::new();
        batch.add(NfListObject::Element(nftables::schema::Element::new(
            FAMILY,
            TABLE.to_string(),
            set.to_string(),
            vec![SetElement::String(ip.to_string())],
        )));
        apply_ruleset(&batch.to_nftables())?;
        self.expiries.lock().insert((set.to_string(), ip), self.clock.now() + ttl);
        Ok(())
    }

    async fn revoke_ip(&self, set: &str, ip: IpAddr) -> Result<(), PacketFilterError> {
        let mut batch = Batch::new();
        batch.delete(NfListObject::Element(nftables::schema::Element::new(
            FAMILY,
            TABLE.to_string(),
            set.to_string(),
            vec![SetElement::String(ip.to_string())],
        )));
        apply_ruleset(&batch.to_nftables())?;
        self.expiries.lock().remove(&(set.to_string(), ip));
        Ok(())
    }

    async fn list_ipset(&self, set: &str) -> Result<Vec<IpSetMember>, PacketFilterError> {
        let expiries = self.expiries.lock();
        Ok(expiries
            .iter()
            .filter(|((s, _), _)| s == set)
            .map(|((_, ip), expires_at)| IpSetMember { address: *ip, expires_at: Some(*expires_at) })
            .collect())
    }

    async fn check_ipset(&self, set: &str, ip: IpAddr) -> Result<bool, PacketFilterError> {
        let now = self.clock.now();
        Ok(self
            .expiries
            .lock()
            .get(&(set.to_string(), ip))
            .is_some_and(|expires_at| *expires_at > now))
    }
}
