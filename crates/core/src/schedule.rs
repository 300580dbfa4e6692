// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compiles a local time-of-day window + day-set + IANA timezone into the
//! UTC `(weekday, hour)` pairs the packet-filter rule compiler matches
//! against. Hour granularity only: minutes on [`TimeOfDay`] are accepted on
//! the HCL surface but do not affect which hours a window covers — the
//! window matches hours `[start_hour, end_hour)`.

use crate::model::{TimeOfDay, Weekday};
use jiff::tz::TimeZone;
use jiff::ToSpan;
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("unknown timezone {0:?}")]
    UnknownTimeZone(String),
}

/// A half-open, inclusive-start/exclusive-end UTC hour interval within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct HourRange {
    pub start: u8,
    pub end: u8,
}

impl HourRange {
    pub fn contains(&self, hour: u8) -> bool {
        (self.start..self.end).contains(&hour)
    }
}

/// A fixed Monday reference date (2024-01-01 was a Monday) used purely as a
/// scaffold to run a given weekday through a timezone's offset rules; the
/// calendar date itself carries no meaning beyond its weekday and DST state.
fn reference_date(weekday_index: u8) -> jiff::civil::Date {
    // weekday_index is always 0..=6, so this addition never overflows;
    // the fallback is unreachable in practice.
    jiff::civil::date(2024, 1, 1)
        .checked_add((weekday_index as i64).days())
        .unwrap_or(jiff::civil::date(2024, 1, 1))
}

fn to_our_weekday(w: jiff::civil::Weekday) -> Weekday {
    Weekday::from_index(w.to_monday_zero_offset() as u8)
}

/// Convert one local `(weekday, hour)` instant to its UTC `(weekday, hour)`
/// counterpart in the given IANA timezone.
fn local_hour_to_utc(day: Weekday, local_hour: u8, tz: &TimeZone) -> Result<(Weekday, u8), ScheduleError> {
    let date = reference_date(day.index());
    let dt = date.at(local_hour as i8, 0, 0, 0);
    let zoned = tz
        .to_zoned(dt)
        .map_err(|_| ScheduleError::UnknownTimeZone(format!("{tz:?}")))?;
    let utc = zoned.in_tz("UTC").map_err(|_| ScheduleError::UnknownTimeZone("UTC".to_string()))?;
    Ok((to_our_weekday(utc.date().weekday()), utc.time().hour() as u8))
}

/// Expand a possibly wrap-around local window into the sequence of
/// `(day-offset, hour)` instants it covers, in order. `day-offset` is 0 for
/// the configured day itself, 1 for "the following day" when the window
/// wraps midnight.
fn local_hours(start: &TimeOfDay, end: &TimeOfDay) -> Vec<(u8, u8)> {
    if start.hour == end.hour {
        return Vec::new();
    }
    if start.hour < end.hour {
        (start.hour..end.hour).map(|h| (0, h)).collect()
    } else {
        let mut hours: Vec<(u8, u8)> = (start.hour..24).map(|h| (0, h)).collect();
        hours.extend((0..end.hour).map(|h| (1, h)));
        hours
    }
}

/// Compile a local `HH:MM`–`HH:MM` window over a set of days and an IANA
/// timezone into the UTC `(weekday, hour-range)` pairs that match it.
///
/// `start == end` compiles to an empty result (matches nothing).
/// Non-wrapping windows produce one UTC weekday per configured day;
/// wrapping windows (`start > end`) may additionally shift across a UTC
/// day boundary on top of the local midnight wrap, exactly as happens
/// when the offending timezone's UTC offset outruns the window itself —
/// e.g. a window that wraps local midnight in Tokyo (UTC+9) can shift by
/// a full UTC day relative to the naive calculation.
pub fn compile_window(
    start: TimeOfDay,
    end: TimeOfDay,
    days: &[Weekday],
    tz: &str,
) -> Result<Vec<(Weekday, HourRange)>, ScheduleError> {
    let timezone = TimeZone::get(tz).map_err(|_| ScheduleError::UnknownTimeZone(tz.to_string()))?;
    let mut by_weekday: std::collections::BTreeMap<Weekday, BTreeSet<u8>> = Default::default();

    for &day in days {
        for (day_offset, local_hour) in local_hours(&start, &end) {
            let shifted_day = if day_offset == 0 { day } else { day.next() };
            let (utc_day, utc_hour) = local_hour_to_utc(shifted_day, local_hour, &timezone)?;
            by_weekday.entry(utc_day).or_default().insert(utc_hour);
        }
    }

    let mut out = Vec::new();
    for (weekday, hours) in by_weekday {
        for range in coalesce(&hours) {
            out.push((weekday, range));
        }
    }
    Ok(out)
}

/// Merge a sorted set of individual hours into contiguous ranges.
fn coalesce(hours: &BTreeSet<u8>) -> Vec<HourRange> {
    let mut ranges = Vec::new();
    let mut iter = hours.iter().copied();
    let Some(first) = iter.next() else { return ranges };
    let mut start = first;
    let mut prev = first;
    for h in iter {
        if h == prev + 1 {
            prev = h;
            continue;
        }
        ranges.push(HourRange { start, end: prev + 1 });
        start = h;
        prev = h;
    }
    ranges.push(HourRange { start, end: prev + 1 });
    ranges
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
