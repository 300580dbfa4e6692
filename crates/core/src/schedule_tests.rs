// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::model::TimeOfDay;

#[test]
fn equal_start_and_end_matches_nothing() {
    let t = TimeOfDay::new(9, 0);
    let out = compile_window(t, t, &[Weekday::Monday], "UTC").unwrap();
    assert!(out.is_empty());
}

#[test]
fn utc_window_does_not_shift_weekday() {
    let out = compile_window(
        TimeOfDay::new(9, 0),
        TimeOfDay::new(17, 0),
        &[Weekday::Monday],
        "UTC",
    )
    .unwrap();
    assert_eq!(out, vec![(Weekday::Monday, HourRange { start: 9, end: 17 })]);
}

#[test]
fn tokyo_scenario_monday_window_stays_on_monday() {
    // Mon 14:00-15:00 JST -> Mon 05:00-06:00 UTC.
    let out = compile_window(
        TimeOfDay::new(14, 0),
        TimeOfDay::new(15, 0),
        &[Weekday::Monday],
        "Asia/Tokyo",
    )
    .unwrap();
    assert_eq!(out, vec![(Weekday::Monday, HourRange { start: 5, end: 6 })]);
}

#[test]
fn tokyo_scenario_wednesday_window_shifts_back_to_tuesday() {
    // Wed 05:00-06:00 JST -> Tue 20:00-21:00 UTC (JST is UTC+9).
    let out = compile_window(
        TimeOfDay::new(5, 0),
        TimeOfDay::new(6, 0),
        &[Weekday::Wednesday],
        "Asia/Tokyo",
    )
    .unwrap();
    assert_eq!(out, vec![(Weekday::Tuesday, HourRange { start: 20, end: 21 })]);
}

#[test]
fn local_midnight_wrap_covers_both_halves() {
    // 22:00-02:00 local wraps: hours 22,23 on the configured day, 0,1 on the next.
    let out = compile_window(
        TimeOfDay::new(22, 0),
        TimeOfDay::new(2, 0),
        &[Weekday::Friday],
        "UTC",
    )
    .unwrap();
    assert_eq!(
        out,
        vec![
            (Weekday::Friday, HourRange { start: 22, end: 24 }),
            (Weekday::Saturday, HourRange { start: 0, end: 2 }),
        ]
    );
}

#[test]
fn unknown_timezone_is_rejected() {
    let err = compile_window(
        TimeOfDay::new(9, 0),
        TimeOfDay::new(17, 0),
        &[Weekday::Monday],
        "Not/AZone",
    )
    .unwrap_err();
    assert!(matches!(err, ScheduleError::UnknownTimeZone(_)));
}
