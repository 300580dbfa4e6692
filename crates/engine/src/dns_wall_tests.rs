// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use ward_adapters::StubPacketFilter;

use super::*;

struct ChannelSource {
    rx: Mutex<mpsc::Receiver<DnsAnswer>>,
    delivered: Mutex<Vec<DnsAnswer>>,
}

#[async_trait]
impl DnsAnswerSource for ChannelSource {
    async fn next_answer(&self) -> Option<DnsAnswer> {
        let answer = self.rx.lock().recv().await;
        if let Some(answer) = &answer {
            self.delivered.lock().push(answer.clone());
        }
        answer
    }

    fn alive_cache(&self) -> Vec<DnsAnswer> {
        self.delivered.lock().clone()
    }
}

fn answer(name: &str, octet: u8, ttl: u32) -> DnsAnswer {
    DnsAnswer { name: name.to_string(), rtype: RecordType::A, addr: IpAddr::V4(Ipv4Addr::new(10, 0, 0, octet)), ttl }
}

#[tokio::test]
async fn run_is_a_noop_when_egress_filtering_disabled() {
    let (_tx, rx) = mpsc::channel(1);
    let source = ChannelSource { rx: Mutex::new(rx), delivered: Mutex::new(Vec::new()) };
    let pf = Arc::new(StubPacketFilter::new());
    let cfg = DnsConfig { egress_filtering: false, ..DnsConfig::default() };
    let wall = DnsWall::new(source, Arc::clone(&pf), cfg);

    wall.run().await; // returns immediately without draining rx
    assert!(!pf.check_ipset("dns-egress", IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))).await.unwrap());
}

#[tokio::test]
async fn authorized_answer_appears_in_the_egress_set() {
    let (tx, rx) = mpsc::channel(4);
    let source = ChannelSource { rx: Mutex::new(rx), delivered: Mutex::new(Vec::new()) };
    let pf = Arc::new(StubPacketFilter::new());
    let cfg = DnsConfig { egress_filtering: true, ..DnsConfig::default() };
    let wall = DnsWall::new(source, Arc::clone(&pf), cfg);

    tx.send(answer("example.com", 1, 300)).await.unwrap();
    drop(tx);
    wall.run().await;
    // the authorize call is detached; give it a moment to land.
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(pf.check_ipset("dns-egress", IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))).await.unwrap());
}

#[tokio::test]
async fn override_ttl_wins_only_when_larger_than_the_record() {
    let cfg_zero = DnsConfig { override_ttl_secs: 0, ..DnsConfig::default() };
    assert_eq!(ttl_effective(&cfg_zero, 120), Duration::from_secs(120));

    let cfg_small = DnsConfig { override_ttl_secs: 30, ..DnsConfig::default() };
    assert_eq!(ttl_effective(&cfg_small, 120), Duration::from_secs(120));

    let cfg_large = DnsConfig { override_ttl_secs: 600, ..DnsConfig::default() };
    assert_eq!(ttl_effective(&cfg_large, 120), Duration::from_secs(600));
}

#[tokio::test]
async fn sync_firewall_reauthorizes_the_alive_cache() {
    let (tx, rx) = mpsc::channel(4);
    let source = ChannelSource { rx: Mutex::new(rx), delivered: Mutex::new(Vec::new()) };
    let pf = Arc::new(StubPacketFilter::new());
    let cfg = DnsConfig { egress_filtering: true, ..DnsConfig::default() };
    let wall = DnsWall::new(source, Arc::clone(&pf), cfg);

    tx.send(answer("example.com", 2, 300)).await.unwrap();
    drop(tx);
    wall.run().await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    wall.sync_firewall().await.expect("sync_firewall");
    assert!(pf.check_ipset("dns-egress", IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2))).await.unwrap());
}
