// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn apply_serializes_to_tagged_variant() {
    let json = serde_json::to_string(&Request::Apply).expect("serialize");
    assert_eq!(json, r#"{"type":"Apply"}"#);
}

#[test]
fn authorize_ip_round_trips() {
    let req = Request::AuthorizeIp { set: "dns-egress".into(), ip: "93.184.216.34".parse().unwrap(), ttl_secs: Some(60) };
    let json = serde_json::to_string(&req).expect("serialize");
    let back: Request = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(req, back);
}

#[test]
fn collaborator_command_carries_opaque_params() {
    let req = Request::CollaboratorCommand {
        method: "uplink.set_priority".into(),
        params: serde_json::json!({ "interface": "wan0", "priority": 1 }),
    };
    let json = serde_json::to_string(&req).expect("serialize");
    let back: Request = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(req, back);
}
