// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_doc(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

#[test]
fn load_valid_document_succeeds_with_no_warnings() {
    let file = write_doc(
        r#"
        interface "eth0" {
          zone = "wan"
          mtu = 1500
        }
        zone "wan" {
          interfaces = ["eth0"]
        }
        "#,
    );
    let (config, warnings) = load(file.path()).expect("valid document loads");
    assert_eq!(config.interfaces.len(), 1);
    assert!(warnings.is_empty());
}

#[test]
fn mtu_at_exact_boundaries_loads_successfully() {
    let file = write_doc(&format!(
        r#"interface "eth0" {{ mtu = {} }}
           interface "eth1" {{ mtu = {} }}"#,
        MTU_MIN, MTU_MAX
    ));
    let (config, _) = load(file.path()).expect("boundary MTUs are valid");
    assert_eq!(config.interfaces[0].mtu, Some(MTU_MIN));
    assert_eq!(config.interfaces[1].mtu, Some(MTU_MAX));
}

#[test]
fn mtu_one_below_minimum_is_a_range_error() {
    let file = write_doc(&format!(r#"interface "eth0" {{ mtu = {} }}"#, MTU_MIN - 1));
    let err = load(file.path()).unwrap_err();
    assert!(matches!(err, LoadError::RangeError { .. }));
}

#[test]
fn mtu_one_above_maximum_is_a_range_error() {
    let file = write_doc(&format!(r#"interface "eth0" {{ mtu = {} }}"#, MTU_MAX + 1));
    let err = load(file.path()).unwrap_err();
    assert!(matches!(err, LoadError::RangeError { .. }));
}

#[test]
fn forgiving_load_substitutes_default_mtu_and_records_recovery() {
    let file = write_doc(&format!(r#"interface "eth0" {{ mtu = {} }}"#, MTU_MAX + 1));
    let (config, _warnings, recovered) = forgiving_load(file.path()).expect("forgiving load never aborts on RangeError");
    assert_eq!(config.interfaces[0].mtu, None);
    assert_eq!(recovered.len(), 1);
}

#[test]
fn policy_referencing_unknown_zone_is_a_reference_error_when_strict() {
    let file = write_doc(
        r#"
        zone "lan" {}
        policy "lan" "ghost" {
          default_action = "drop"
        }
        "#,
    );
    let err = load(file.path()).unwrap_err();
    assert!(matches!(err, LoadError::ReferenceError { .. }));
}

#[test]
fn forgiving_load_drops_policy_with_unknown_zone_reference() {
    let file = write_doc(
        r#"
        zone "lan" {}
        policy "lan" "ghost" {
          default_action = "drop"
        }
        "#,
    );
    let (config, _warnings, recovered) =
        forgiving_load(file.path()).expect("forgiving load drops the bad policy instead of aborting");
    assert!(config.policies.is_empty());
    assert_eq!(recovered.len(), 1);
}

#[test]
fn newer_schema_version_is_rejected() {
    let file = write_doc(&format!("schema_version = {}", SCHEMA_VERSION + 1));
    let err = load(file.path()).unwrap_err();
    assert!(matches!(err, LoadError::SchemaMismatch { .. }));
}

#[test]
fn syntax_error_aborts_even_in_forgiving_mode() {
    let file = write_doc("interface \"eth0\" { this is not valid hcl");
    let err = forgiving_load(file.path()).unwrap_err();
    assert!(matches!(err, LoadError::SyntaxError { .. }));
}

#[test]
fn rule_port_spec_parses_single_and_range() {
    let file = write_doc(
        r#"
        zone "lan" {}
        zone "wan" {}
        policy "lan" "wan" {
          default_action = "accept"
          rule "r1" { action = "drop" dest_port = "22" }
          rule "r2" { action = "drop" dest_port = "8000-8010" }
        }
        "#,
    );
    let (config, _) = load(file.path()).expect("valid document");
    let rules = &config.policies[0].rules;
    assert_eq!(rules[0].dest_port, Some(ward_core::PortSpec::Single(22)));
    assert_eq!(rules[1].dest_port, Some(ward_core::PortSpec::Range(8000, 8010)));
}

#[test]
fn address_match_prefixes_select_variants() {
    assert_eq!(parse_address_match("zone:lan"), ward_core::AddressMatch::ZoneMember("lan".into()));
    assert_eq!(parse_address_match("ipset:blocklist"), ward_core::AddressMatch::IpSet("blocklist".into()));
    assert_eq!(parse_address_match("10.0.0.0/8"), ward_core::AddressMatch::Cidr("10.0.0.0/8".into()));
    assert_eq!(parse_address_match("printer.local"), ward_core::AddressMatch::Host("printer.local".into()));
}
