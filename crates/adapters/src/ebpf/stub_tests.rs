// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn generous_budget() -> EbpfBudget {
    EbpfBudget { cpu_percent: 100.0, memory_bytes: 1024 * 1024 * 1024, events_per_sec: 1_000_000, packets_per_sec: 10_000_000 }
}

#[tokio::test]
async fn update_blocklist_requires_the_feature_attached() {
    let bridge = StubEbpfBridge::new(generous_budget());
    let err = bridge.update_blocklist(Ipv4Addr::new(10, 0, 0, 1), 42).await.unwrap_err();
    assert!(matches!(err, EbpfError::NotAttached(EbpfFeature::XdpBlocklist)));
}

#[tokio::test]
async fn attach_then_update_blocklist_succeeds() {
    let bridge = StubEbpfBridge::new(generous_budget());
    bridge.attach(EbpfFeature::XdpBlocklist).await.expect("attach");
    bridge.update_blocklist(Ipv4Addr::new(10, 0, 0, 1), 42).await.expect("update");
    assert!(bridge.is_blocklisted(Ipv4Addr::new(10, 0, 0, 1)));
}

#[tokio::test]
async fn verdict_is_fail_open_for_unseeded_flows() {
    let bridge = StubEbpfBridge::new(generous_budget());
    let flow = FlowKey { src: Ipv4Addr::new(10, 0, 0, 1), dst: Ipv4Addr::new(1, 1, 1, 1), src_port: 1234, dst_port: 443, protocol: 6 };
    assert_eq!(bridge.verdict(&flow).await, Verdict::Accept);
}

#[tokio::test]
async fn seeded_flow_returns_its_verdict() {
    let bridge = StubEbpfBridge::new(generous_budget());
    let flow = FlowKey { src: Ipv4Addr::new(10, 0, 0, 1), dst: Ipv4Addr::new(1, 1, 1, 1), src_port: 1234, dst_port: 443, protocol: 6 };
    bridge.seed_flow(flow, Verdict::Drop);
    assert_eq!(bridge.verdict(&flow).await, Verdict::Drop);
}
