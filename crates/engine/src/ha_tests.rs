// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use ward_adapters::{StubDhcpReclaimer, StubLinkLayer};
use ward_core::{FakeClock, HaMode, MacAddr, VirtualIp, VirtualMac, VirtualResource};

use super::*;

fn base_config(node_id: &str, mode: HaMode, priority: u32) -> HaConfig {
    HaConfig {
        mode,
        node_id: node_id.to_string(),
        peers: Vec::new(),
        heartbeat_port: 9002,
        heartbeat_interval: Duration::from_secs(1),
        failure_threshold: 3,
        priority,
        failback_delay: Duration::from_secs(60),
        shared_secret: Some("s3cret".to_string()),
        virtual_resources: vec![
            VirtualResource::VirtualMac(VirtualMac { interface: "eth0".to_string(), address: None, dhcp: true }),
            VirtualResource::VirtualIp(VirtualIp {
                address: "10.0.0.100/24".parse().unwrap(),
                interface: "eth0".to_string(),
                label: None,
            }),
        ],
    }
}

type TestService = HaService<StubLinkLayer, StubDhcpReclaimer, StubConntrackSync, FakeClock>;

fn service(mode: HaMode, priority: u32) -> (TestService, Arc<StubLinkLayer>, Arc<StubDhcpReclaimer>, Arc<StubConntrackSync>) {
    let link = Arc::new(StubLinkLayer::new());
    let dhcp = Arc::new(StubDhcpReclaimer::new());
    let conntrack = Arc::new(StubConntrackSync::new());
    let svc = HaService::new(
        base_config("node-a", mode, priority),
        Arc::clone(&link),
        Arc::clone(&dhcp),
        Arc::clone(&conntrack),
        FakeClock::new(),
        None,
    );
    (svc, link, dhcp, conntrack)
}

#[test]
fn sign_and_verify_round_trip() {
    let payload = SignablePayload { node_id: "node-a".into(), role: HaRole::Backup, priority: 100, state_version: 1, timestamp: 1000 };
    let signature = sign(b"s3cret", &payload).expect("sign");
    assert!(verify(b"s3cret", &payload, &signature).expect("verify"));
    assert!(!verify(b"wrong-secret", &payload, &signature).expect("verify"));
}

#[tokio::test]
async fn failover_migrates_virtual_resources_and_commits_conntrack() {
    let (svc, link, dhcp, conntrack) = service(HaMode::Backup, 100);
    let default_status = link.query("eth0").await.expect("query");
    link.seed(ward_adapters::LinkStatus { mac: Some(MacAddr::new([0, 1, 2, 3, 4, 5])), ..default_status });

    svc.failover().await.expect("failover");

    assert_eq!(svc.state(), HaState::Primary);
    let status = link.query("eth0").await.expect("query");
    assert_eq!(status.addresses.len(), 1);
    assert_eq!(dhcp.calls().len(), 1);
    assert_eq!(conntrack.calls(), vec!["commit"]);
}

#[tokio::test]
async fn tick_triggers_failover_once_threshold_reached() {
    let (svc, _link, _dhcp, _conntrack) = service(HaMode::Backup, 100);
    svc.tick().await.expect("tick 1");
    assert_eq!(svc.state(), HaState::Backup);
    svc.tick().await.expect("tick 2");
    assert_eq!(svc.state(), HaState::Backup);
    svc.tick().await.expect("tick 3 crosses threshold");
    assert_eq!(svc.state(), HaState::Primary);
}

#[tokio::test]
async fn higher_priority_peer_claiming_primary_does_not_demote_us() {
    let (svc, link, _dhcp, _conntrack) = service(HaMode::Primary, 100);
    // Drive one failover so the virtual MAC/IP are actually applied and
    // would be unwound if a demotion wrongly happened.
    svc.failover().await.expect("failover");
    assert_eq!(svc.state(), HaState::Primary);

    let peer_payload = SignablePayload { node_id: "node-b".into(), role: HaRole::Primary, priority: 200, state_version: 0, timestamp: 1 };
    let peer_signature = sign(b"s3cret", &peer_payload).expect("sign");
    let hb = Heartbeat { payload: peer_payload, signature: Some(peer_signature) };

    svc.handle_received(&hb).await.expect("handle_received");

    // The peer's priority (200) is higher than ours (100), so the peer
    // loses the split-brain and we hold Primary.
    assert_eq!(svc.state(), HaState::Primary);
    let status = link.query("eth0").await.expect("query");
    assert!(!status.addresses.is_empty());
}

#[tokio::test]
async fn lower_priority_peer_claiming_primary_demotes_us() {
    let (svc, link, _dhcp, _conntrack) = service(HaMode::Primary, 200);
    svc.failover().await.expect("failover");
    assert_eq!(svc.state(), HaState::Primary);

    let peer_payload = SignablePayload { node_id: "node-b".into(), role: HaRole::Primary, priority: 50, state_version: 0, timestamp: 1 };
    let peer_signature = sign(b"s3cret", &peer_payload).expect("sign");
    let hb = Heartbeat { payload: peer_payload, signature: Some(peer_signature) };

    svc.handle_received(&hb).await.expect("handle_received");

    // Our priority (200) is higher than the peer's (50), so we lose the
    // split-brain and demote.
    assert_eq!(svc.state(), HaState::Backup);
    let status = link.query("eth0").await.expect("query");
    assert!(status.addresses.is_empty());
}

#[tokio::test]
async fn heartbeat_with_bad_signature_is_rejected() {
    let (svc, _link, _dhcp, _conntrack) = service(HaMode::Backup, 100);
    let payload = SignablePayload { node_id: "node-b".into(), role: HaRole::Primary, priority: 50, state_version: 0, timestamp: 1 };
    let hb = Heartbeat { payload, signature: Some(vec![0u8; 32]) };

    let err = svc.handle_received(&hb).await.unwrap_err();
    assert!(matches!(err, HaError::SignatureInvalid));
}
