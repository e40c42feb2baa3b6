use super::*;
use time::macros::datetime;

const DAY: i64 = TOTAL_DAYS;

#[test]
fn one_second_before_start_is_day_zero() {
    let now = datetime!(2025-06-10 23:59:59 UTC);
    let state = compute_countdown(now, START_DATE, DAY, 0);
    assert_eq!(state.days_passed, 0);
}

#[test]
fn start_instant_is_day_one() {
    let now = datetime!(2025-06-11 00:00:00 UTC);
    let state = compute_countdown(now, START_DATE, DAY, 0);
    assert_eq!(state.days_passed, 1);
}

#[test]
fn days_passed_is_monotonic_and_clamped() {
    let mut previous = 0;
    let mut now = datetime!(2025-06-01 12:00:00 UTC);
    for _ in 0..1100 {
        let state = compute_countdown(now, START_DATE, DAY, 0);
        assert!(state.days_passed >= previous, "days_passed went backwards");
        assert!(state.days_passed <= DAY);
        previous = state.days_passed;
        now += Duration::days(1);
    }
    assert_eq!(previous, DAY);
}

#[test]
fn sub_day_remainder_counts_to_next_midnight() {
    let now = datetime!(2025-06-11 18:00:00 UTC);
    let state = compute_countdown(now, START_DATE, DAY, 0);
    assert_eq!(state.hours_remaining, 6);
    assert_eq!(state.minutes_remaining, 0);
    assert_eq!(state.seconds_remaining, 0);
}

#[test]
fn remainder_mid_minute() {
    let now = datetime!(2025-06-11 23:59:30.500 UTC);
    let state = compute_countdown(now, START_DATE, DAY, 0);
    assert_eq!(state.hours_remaining, 0);
    assert_eq!(state.minutes_remaining, 0);
    assert_eq!(state.seconds_remaining, 29);
}

#[test]
fn total_is_days_plus_remainder() {
    let now = datetime!(2025-06-11 12:00:00 UTC);
    let state = compute_countdown(now, START_DATE, DAY, 0);
    assert_eq!(
        state.total_millis_remaining,
        state.days_remaining * MILLIS_PER_DAY + 12 * 60 * 60 * 1000
    );
}

#[test]
fn past_end_clamps_to_zero_and_expires() {
    let now = datetime!(2028-03-09 00:00:00 UTC);
    let state = compute_countdown(now, START_DATE, DAY, 0);
    assert_eq!(state.total_millis_remaining, 0);
    assert_eq!(state.days_passed, DAY);
    assert!(state.is_expired());
}

#[test]
fn positive_offset_rolls_day_earlier() {
    // 11:00 UTC on June 10 is already June 11 at UTC+14.
    let now = datetime!(2025-06-10 11:00:00 UTC);
    let utc_view = compute_countdown(now, START_DATE, DAY, 0);
    let shifted_view = compute_countdown(now, START_DATE, DAY, 14);
    assert_eq!(utc_view.days_passed, 0);
    assert_eq!(shifted_view.days_passed, 1);
}

#[test]
fn negative_offset_holds_previous_day() {
    // The start midnight shifts back to June 10 at UTC-10, so June 9 in the
    // shifted frame is still before the window.
    let now = datetime!(2025-06-10 03:00:00 UTC);
    let state = compute_countdown(now, START_DATE, DAY, -10);
    assert_eq!(state.days_passed, 0);
}

// ===== daily job day number =====

#[test]
fn job_day_number_never_below_one() {
    let now = datetime!(2025-01-01 00:00:00 UTC);
    assert_eq!(current_day_number(now, START_DATE, DAY), 1);
}

#[test]
fn job_day_number_uses_utc_plus_fourteen() {
    // 10:00 UTC June 10 → June 11 00:00 at UTC+14 → day 1.
    let now = datetime!(2025-06-10 10:00:00 UTC);
    assert_eq!(current_day_number(now, START_DATE, DAY), 1);
    // An hour earlier is still June 10 in the shifted frame → clamped to 1.
    let now = datetime!(2025-06-10 09:00:00 UTC);
    assert_eq!(current_day_number(now, START_DATE, DAY), 1);
    // 10:00 UTC June 11 → one full day elapsed → day 2.
    let now = datetime!(2025-06-11 10:00:00 UTC);
    assert_eq!(current_day_number(now, START_DATE, DAY), 2);
}

#[test]
fn job_day_number_clamps_to_window_end() {
    let now = datetime!(2030-01-01 00:00:00 UTC);
    assert_eq!(current_day_number(now, START_DATE, DAY), DAY);
}
