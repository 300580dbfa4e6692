// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn vlan_child_name_is_parent_dot_id() {
    let vlan = Vlan { id: 100, zone: None, ipv4: Vec::new() };
    assert_eq!(vlan.child_name("eth0"), "eth0.100");
}

#[test]
fn interface_vlan_child_names_iterates_all() {
    let mut iface = Interface::new("eth0");
    iface.vlans.push(Vlan { id: 10, zone: None, ipv4: Vec::new() });
    iface.vlans.push(Vlan { id: 20, zone: None, ipv4: Vec::new() });
    let names: Vec<_> = iface.vlan_child_names().collect();
    assert_eq!(names, vec!["eth0.10", "eth0.20"]);
}

#[test]
fn new_interface_has_no_addresses_and_is_enabled() {
    let iface = Interface::new("wan0");
    assert!(!iface.disabled);
    assert!(iface.ipv4.is_empty());
    assert!(iface.vrf.is_none());
}
