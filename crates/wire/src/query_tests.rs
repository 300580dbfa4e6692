// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn get_config_round_trips_staged_flag() {
    let q = Query::GetConfig { staged: true };
    let json = serde_json::to_string(&q).expect("serialize");
    let back: Query = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(q, back);
}

#[test]
fn check_ipset_round_trips() {
    let q = Query::CheckIpSet { set: "blocklist".into(), ip: "10.0.0.1".parse().unwrap() };
    let json = serde_json::to_string(&q).expect("serialize");
    let back: Query = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(q, back);
}
