//! Countdown arithmetic — day numbering and time-remaining math.
//!
//! DESIGN
//! ======
//! All calendar math runs against a shifted-UTC view: the caller's fixed
//! offset is added to the UTC wall clock, and midnights are taken in that
//! shifted frame. No platform timezone database is consulted, so the same
//! instant always yields the same day number everywhere.

use time::macros::date;
use time::{Date, Duration, OffsetDateTime, UtcOffset};

/// First day of the countdown window. Day 1 starts at this date's midnight.
pub const START_DATE: Date = date!(2025 - 06 - 11);

/// Length of the countdown window in days.
pub const TOTAL_DAYS: i64 = 1000;

/// UTC offset used by the daily content job: the earliest timezone on the
/// planet, so a new day's content is ready before anyone's local midnight.
pub const DAILY_JOB_UTC_OFFSET_HOURS: i8 = 14;

pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

// =============================================================================
// TYPES
// =============================================================================

/// Derived countdown snapshot. Recomputed every tick; nothing persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownState {
    /// Milliseconds until the end of the window, floored at 0.
    pub total_millis_remaining: i64,
    /// Local-midnight boundaries between now and the end of the window.
    pub days_remaining: i64,
    pub hours_remaining: i64,
    pub minutes_remaining: i64,
    pub seconds_remaining: i64,
    /// 1-based day number, clamped to `[0, total_days]`. 0 before the start.
    pub days_passed: i64,
}

impl CountdownState {
    /// True once the window has fully elapsed and the tick should stop.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.total_millis_remaining <= 0
    }
}

// =============================================================================
// COUNTDOWN
// =============================================================================

/// Shift an instant into the fixed-offset wall-clock frame.
fn to_shifted(instant: OffsetDateTime, utc_offset_hours: i8) -> OffsetDateTime {
    instant.to_offset(UtcOffset::UTC) + Duration::hours(i64::from(utc_offset_hours))
}

/// Compute the countdown state for `now` against a fixed window.
///
/// `days_passed` counts local-midnight boundaries crossed since the start
/// date's midnight, plus one so the start day itself is day 1. Before the
/// start it is 0; at or past the end it stays clamped to `total_days`.
#[must_use]
pub fn compute_countdown(
    now: OffsetDateTime,
    start_date: Date,
    total_days: i64,
    utc_offset_hours: i8,
) -> CountdownState {
    let offset = Duration::hours(i64::from(utc_offset_hours));
    let now_shifted = to_shifted(now, utc_offset_hours);

    let start_instant = start_date.midnight().assume_utc();
    let start_midnight = (start_instant + offset).date();
    let end_midnight = (start_instant + Duration::days(total_days) + offset).date();
    let now_midnight = now_shifted.date();

    let days_difference = (now_midnight - start_midnight).whole_days();
    let days_passed = if days_difference >= 0 {
        (days_difference + 1).min(total_days)
    } else {
        0
    };
    let days_remaining = (end_midnight - now_midnight).whole_days();

    // Sub-day remainder: wall-clock distance to the next shifted midnight.
    let next_midnight = now_midnight.midnight().assume_utc() + Duration::days(1);
    let until_next_day = next_midnight - now_shifted;

    let hours_remaining = until_next_day.whole_hours();
    let minutes_remaining = until_next_day.whole_minutes() % 60;
    let seconds_remaining = until_next_day.whole_seconds() % 60;

    let total = days_remaining * MILLIS_PER_DAY
        + i64::try_from(until_next_day.whole_milliseconds()).unwrap_or(0);

    CountdownState {
        total_millis_remaining: total.max(0),
        days_remaining,
        hours_remaining,
        minutes_remaining,
        seconds_remaining,
        days_passed,
    }
}

// =============================================================================
// DAY NUMBER (daily job variant)
// =============================================================================

/// Current day number as seen by the daily content job.
///
/// Unlike [`compute_countdown`], this variant measures the raw instant
/// distance from the start (no midnight snapping) in the UTC+14 frame, and
/// never returns less than 1 — content generation always targets a real day.
#[must_use]
pub fn current_day_number(now: OffsetDateTime, start_date: Date, total_days: i64) -> i64 {
    let shifted = now.to_offset(UtcOffset::UTC) + Duration::hours(i64::from(DAILY_JOB_UTC_OFFSET_HOURS));
    let start_instant = start_date.midnight().assume_utc();

    let millis = (shifted - start_instant).whole_milliseconds();
    let days_diff = millis.div_euclid(i128::from(MILLIS_PER_DAY));
    let days_diff = i64::try_from(days_diff).unwrap_or(0);
    let days_passed = if days_diff >= 0 { days_diff + 1 } else { 0 };

    days_passed.clamp(1, total_days)
}

#[cfg(test)]
#[path = "countdown_test.rs"]
mod tests;
