//! Weekly reset window calculations.
//!
//! The game world resets weekly bosses on Thursday 00:00 UTC, so a "week"
//! for tracking purposes runs Thursday through Wednesday. Every boss run
//! stores the Thursday that opened its window (`week_start`) so duplicate
//! checks and weekly summaries are a single date comparison.

use chrono::{Datelike, Duration, NaiveDate, Utc};

use crate::types::Timestamp;

/// Weekday index of the reset boundary, counted from Monday (Thursday = 3).
pub const RESET_WEEKDAY_FROM_MONDAY: i64 = 3;

/// The Thursday on or before the given calendar date.
///
/// Total and deterministic: any two dates inside the same reset window map
/// to the same Thursday, and a Thursday maps to itself.
pub fn week_start_for(date: NaiveDate) -> NaiveDate {
    let days_since_reset =
        (date.weekday().num_days_from_monday() as i64 - RESET_WEEKDAY_FROM_MONDAY).rem_euclid(7);
    date - Duration::days(days_since_reset)
}

/// Week start for a timestamp, using its UTC calendar date.
///
/// Time of day never changes the answer; only the date matters.
pub fn week_start_for_datetime(ts: Timestamp) -> NaiveDate {
    week_start_for(ts.date_naive())
}

/// Week start of the current reset period.
pub fn current_week_start() -> NaiveDate {
    week_start_for_datetime(Utc::now())
}
