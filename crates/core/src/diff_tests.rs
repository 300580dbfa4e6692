// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::model::{Action, Config, Interface, Policy};

#[test]
fn empty_diff_between_identical_configs() {
    let mut cfg = Config::default();
    cfg.interfaces.push(Interface::new("wan0"));
    let d = diff(&cfg, &cfg);
    assert!(d.is_empty());
}

#[test]
fn added_interface_is_reported_once() {
    let running = Config::default();
    let mut staged = Config::default();
    staged.interfaces.push(Interface::new("lan0"));

    let d = diff(&running, &staged);
    assert_eq!(d.interfaces.len(), 1);
    assert!(matches!(&d.interfaces[0], Change::Added(i) if i.name == "lan0"));
}

#[test]
fn removed_interface_is_reported_as_removal() {
    let mut running = Config::default();
    running.interfaces.push(Interface::new("lan0"));
    let staged = Config::default();

    let d = diff(&running, &staged);
    assert_eq!(d.interfaces.len(), 1);
    assert!(d.interfaces[0].is_removal());
}

#[test]
fn modified_interface_carries_both_sides() {
    let mut running = Config::default();
    running.interfaces.push(Interface::new("wan0"));
    let mut staged = Config::default();
    let mut changed = Interface::new("wan0");
    changed.mtu = Some(1400);
    staged.interfaces.push(changed);

    let d = diff(&running, &staged);
    match &d.interfaces[0] {
        Change::Modified(old, new) => {
            assert!(old.mtu.is_none());
            assert_eq!(new.mtu, Some(1400));
        }
        other => panic!("expected Modified, got {other:?}"),
    }
}

#[test]
fn policy_identity_is_from_to_zone_pair() {
    let mut running = Config::default();
    running.policies.push(Policy::new("lan", "wan", Action::Accept));
    let mut staged = Config::default();
    staged.policies.push(Policy::new("lan", "wan", Action::Drop));

    let d = diff(&running, &staged);
    assert_eq!(d.policies.len(), 1);
    assert!(matches!(&d.policies[0], Change::Modified(_, _)));
}

#[test]
fn ip_forwarding_flag_change_is_flagged() {
    let running = Config::default();
    let mut staged = Config::default();
    staged.ip_forwarding = true;

    let d = diff(&running, &staged);
    assert!(d.ip_forwarding_changed);
    assert!(!d.is_empty());
}
