// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use ward_adapters::{StubLinkLayer, StubPacketFilter};
use ward_core::{Action, Interface, Policy, Vlan, Zone, ZoneMatch};

use super::*;

fn reconciler() -> (NetworkReconciler<StubLinkLayer, StubPacketFilter>, Arc<StubLinkLayer>) {
    let link = Arc::new(StubLinkLayer::new());
    let pf = Arc::new(StubPacketFilter::new());
    (NetworkReconciler::new(Arc::clone(&link), pf), link)
}

#[tokio::test]
async fn apply_addresses_a_new_interface_and_applies_policies() {
    let (reconciler, link) = reconciler();
    let running = Config::default();
    let mut staged = Config::default();
    let mut eth0 = Interface::new("eth0");
    eth0.ipv4 = vec!["10.0.0.1/24".parse().unwrap()];
    staged.interfaces.push(eth0);
    staged.zones.push(Zone::new("lan"));
    staged.policies.push(Policy::new("lan", "lan", Action::Accept));

    ApplyHook::apply(&reconciler, &running, &staged).await.expect("apply");

    let status = link.query("eth0").await.expect("query");
    assert_eq!(status.addresses.len(), 1);
}

#[tokio::test]
async fn removing_a_zoned_interface_is_rejected() {
    let (reconciler, _link) = reconciler();
    let mut running = Config::default();
    running.interfaces.push(Interface::new("eth0"));

    let mut staged = Config::default();
    let mut lan = Zone::new("lan");
    lan.matches.push(ZoneMatch::Interface("eth0".to_string()));
    staged.zones.push(lan);
    // eth0 dropped from staged.interfaces but still referenced by the zone.

    let err = ApplyHook::apply(&reconciler, &running, &staged).await.unwrap_err();
    assert!(err.to_string().contains("eth0"));
}

#[tokio::test]
async fn modifying_an_interface_drops_its_removed_vlan() {
    let (reconciler, link) = reconciler();
    let mut running = Config::default();
    let mut eth0 = Interface::new("eth0");
    eth0.vlans.push(Vlan { id: 10, zone: None, ipv4: Vec::new() });
    running.interfaces.push(eth0.clone());
    ApplyHook::apply(&reconciler, &Config::default(), &running).await.expect("seed apply");
    assert!(link.query("eth0.10").await.is_ok());

    let mut staged = Config::default();
    eth0.vlans.clear();
    staged.interfaces.push(eth0);

    ApplyHook::apply(&reconciler, &running, &staged).await.expect("apply");

    let names: Vec<String> = link.query_all().await.expect("query_all").into_iter().map(|s| s.name).collect();
    assert!(!names.contains(&"eth0.10".to_string()));
}

#[tokio::test]
async fn rollback_reconverges_the_kernel_to_running_from_scratch() {
    let (reconciler, link) = reconciler();
    let mut running = Config::default();
    let mut eth0 = Interface::new("eth0");
    eth0.ipv4 = vec!["192.168.1.1/24".parse().unwrap()];
    running.interfaces.push(eth0);

    ApplyHook::rollback(&reconciler, &running).await.expect("rollback");

    let status = link.query("eth0").await.expect("query");
    assert_eq!(status.addresses.len(), 1);
}

#[test]
fn snapshot_then_restore_round_trips_interfaces() {
    let mut config = Config::default();
    config.interfaces.push(Interface::new("eth0"));
    let snapshot = snapshot_interfaces(&config);

    config.interfaces.push(Interface::new("eth1"));
    assert_eq!(config.interfaces.len(), 2);

    restore_interfaces(&mut config, snapshot);
    assert_eq!(config.interfaces.len(), 1);
    assert_eq!(config.interfaces[0].name, "eth0");
}
