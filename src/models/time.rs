//! Local-time helpers for calendar-day scheduling.
//!
//! All interval bounds and duplicate-day rules are expressed in calendar
//! days *in the post's timezone*; this module centralizes the conversions
//! between UTC instants and local calendar days.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Parse an IANA timezone name (e.g. "Europe/Madrid").
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.parse().ok()
}

/// Resolve a timezone name, falling back to UTC for unknown names.
///
/// Post creation validates the name strictly; this lenient form protects
/// scheduling paths against state written before validation existed.
pub fn resolve_timezone(name: &str) -> Tz {
    match parse_timezone(name) {
        Some(tz) => tz,
        None => {
            tracing::warn!(timezone = name, "unknown timezone, falling back to UTC");
            Tz::UTC
        }
    }
}

/// The local calendar day of a UTC instant in the given timezone.
pub fn local_day(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Combine a local calendar day and time-of-day into a UTC instant.
///
/// For local times that do not exist (DST spring-forward gap) the naive
/// datetime is interpreted as UTC; for ambiguous times (fall-back fold)
/// the earlier instant wins.
pub fn at_local_time(day: NaiveDate, time: NaiveTime, tz: Tz) -> DateTime<Utc> {
    let naive = day.and_time(time);
    match tz.from_local_datetime(&naive).earliest() {
        Some(local) => local.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&naive),
    }
}

/// Whole calendar days between two instants, measured in the given timezone.
///
/// This is a calendar difference, not an elapsed-time difference: an
/// instant late on day 0 and another early on day 1 are one day apart.
pub fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>, tz: Tz) -> i64 {
    local_day(later, tz)
        .signed_duration_since(local_day(earlier, tz))
        .num_days()
}
