// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn range_error_converts_into_ward_error() {
    let err = LoadError::RangeError { path: "interfaces[0].mtu".into(), message: "too small".into() };
    let ward: WardError = err.into();
    assert_eq!(ward.kind(), "state_inconsistent");
}

#[test]
fn warning_display_includes_path() {
    let w = Warning::new("dns.override_ttl_secs", "ignored, feature disabled");
    assert_eq!(w.to_string(), "dns.override_ttl_secs: ignored, feature disabled");
}
