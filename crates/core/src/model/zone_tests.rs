// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn interface_matches_filters_out_cidr_predicates() {
    let mut zone = Zone::new("lan");
    zone.matches.push(ZoneMatch::Interface("eth0".into()));
    zone.matches.push(ZoneMatch::SourceCidr("10.0.0.0/8".parse().unwrap()));
    zone.matches.push(ZoneMatch::Interface("eth1".into()));

    let names: Vec<_> = zone.interface_matches().collect();
    assert_eq!(names, vec!["eth0", "eth1"]);
}

#[test]
fn new_zone_has_no_matches() {
    let zone = Zone::new("wan");
    assert!(zone.matches.is_empty());
    assert!(zone.management.is_none());
}
