// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn port_spec_single_contains_only_itself() {
    let spec = PortSpec::Single(443);
    assert!(spec.contains(443));
    assert!(!spec.contains(80));
}

#[test]
fn port_spec_range_is_inclusive() {
    let spec = PortSpec::Range(8000, 8010);
    assert!(spec.contains(8000));
    assert!(spec.contains(8010));
    assert!(!spec.contains(7999));
    assert!(!spec.contains(8011));
}

#[test]
fn time_of_day_parses_hh_mm() {
    let t: TimeOfDay = "14:05".parse().unwrap();
    assert_eq!(t, TimeOfDay::new(14, 5));
}

#[test]
fn time_of_day_rejects_bad_input() {
    assert!("25:00".parse::<TimeOfDay>().is_err());
    assert!("14:60".parse::<TimeOfDay>().is_err());
    assert!("nope".parse::<TimeOfDay>().is_err());
}

#[test]
fn time_of_day_display_roundtrips() {
    let t = TimeOfDay::new(5, 9);
    assert_eq!(t.to_string(), "05:09");
}

#[test]
fn weekday_next_wraps_sunday_to_monday() {
    assert_eq!(Weekday::Sunday.next(), Weekday::Monday);
    assert_eq!(Weekday::Monday.next(), Weekday::Tuesday);
}

#[test]
fn weekday_index_roundtrips() {
    for i in 0..7u8 {
        assert_eq!(Weekday::from_index(i).index(), i);
    }
}

#[test]
fn rule_has_schedule_detects_either_bound() {
    let mut rule = Rule::new("r1", Action::Accept);
    assert!(!rule.has_schedule());
    rule.time_start = Some(TimeOfDay::new(9, 0));
    assert!(rule.has_schedule());
}

#[test]
fn policy_key_is_from_to_pair() {
    let policy = Policy::new("lan", "wan", Action::Drop);
    assert_eq!(policy.key(), ("lan", "wan"));
}
