// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const DOC: &str = r#"
schema_version = 1
ip_forwarding = true

interface "eth0" {
  zone = "wan"
  mtu = 1500
  ipv4 = ["203.0.113.5/24"]
}

interface "eth1" {
  zone = "lan"
  vlans = [
    { id = 100, zone = "guest" }
  ]
}

zone "wan" {
  interfaces = ["eth0"]
}

zone "lan" {
  interfaces = ["eth1"]
}

policy "lan" "wan" {
  default_action = "accept"

  rule "block-telnet" {
    action = "drop"
    protocol = "tcp"
    dest_port = "23"
  }
}

dns {
  egress_filtering = true
  egress_set = "egress-wall"
}
"#;

#[test]
fn parses_full_document() {
    let cfg: RawConfig = hcl::from_str(DOC).expect("valid HCL");
    assert_eq!(cfg.schema_version, 1);
    assert!(cfg.ip_forwarding);
    assert_eq!(cfg.interfaces.len(), 2);
    assert_eq!(cfg.interfaces[0].name, "eth0");
    assert_eq!(cfg.interfaces[1].vlans.len(), 1);
    assert_eq!(cfg.zones.len(), 2);
    assert_eq!(cfg.policies.len(), 1);
    assert_eq!(cfg.policies[0].rules.len(), 1);
    assert_eq!(cfg.policies[0].rules[0].action, "drop");
    assert!(cfg.dns.unwrap().egress_filtering);
}

#[test]
fn missing_schema_version_defaults_to_current() {
    let cfg: RawConfig = hcl::from_str(r#"interface "eth0" {}"#).expect("valid HCL");
    assert_eq!(cfg.schema_version, ward_core::SCHEMA_VERSION);
}

#[test]
fn unknown_top_level_attribute_rejected_by_parser_not_silently_dropped() {
    // Interface-level unknowns land in `extra` (forgiving); the document
    // root has no catch-all, matching hard-failure on truly unrecognized
    // shape rather than the per-block recoverable path.
    let cfg: RawConfig = hcl::from_str(
        r#"
        interface "eth0" {
          unknown_attr = "whatever"
        }
        "#,
    )
    .expect("valid HCL");
    assert!(cfg.interfaces[0].extra.contains_key("unknown_attr"));
}
