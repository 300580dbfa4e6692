// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn ok_variant_reports_is_ok() {
    assert!(Response::Ok.is_ok());
    assert!(!Response::Err(WardError::Canceled).is_ok());
}

#[test]
fn err_conversion_preserves_kind() {
    let resp: Response = WardError::PeerUnavailable("10.0.0.2".into()).into();
    assert_eq!(resp.err().map(WardError::kind), Some("peer_unavailable"));
}

#[test]
fn response_round_trips_through_json() {
    let resp = Response::IpSetCheck(true);
    let json = serde_json::to_string(&resp).expect("serialize");
    let back: Response = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(resp, back);
}
