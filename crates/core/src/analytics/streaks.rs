//! Consecutive-day streak math over distinct local calendar dates.

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, NaiveDate};

/// Hard cap on how far back a streak walk goes.
pub const STREAK_LOOKBACK_DAYS: u32 = 365;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CurrentStreak {
    pub length: u32,
    pub started_on: Option<NaiveDate>,
}

/// The local calendar day an RFC3339 instant falls on. `None` for anything
/// unparsable — malformed rows degrade to "no workout" rather than failing.
pub fn local_day(timestamp: &str, offset: FixedOffset) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|instant| instant.with_timezone(&offset).date_naive())
}

/// Streak ending today or yesterday. Walks backwards one calendar day at a
/// time from the anchor while each day has a workout.
pub fn current_streak(dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> CurrentStreak {
    let anchor = if dates.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) if dates.contains(&yesterday) => yesterday,
            _ => return CurrentStreak::default(),
        }
    };

    let mut cursor = anchor;
    let mut length = 0u32;
    let mut started_on = anchor;
    for _ in 0..STREAK_LOOKBACK_DAYS {
        if !dates.contains(&cursor) {
            break;
        }
        length += 1;
        started_on = cursor;
        match cursor.pred_opt() {
            Some(previous) => cursor = previous,
            None => break,
        }
    }

    CurrentStreak {
        length,
        started_on: Some(started_on),
    }
}

/// Historical maximum: one forward pass over the distinct dates, resetting
/// whenever consecutive dates are not exactly one day apart.
pub fn longest_streak(dates: &BTreeSet<NaiveDate>) -> u32 {
    let mut longest = 0u32;
    let mut run = 0u32;
    let mut previous: Option<NaiveDate> = None;

    for &date in dates {
        run = match previous {
            Some(prev) if prev.succ_opt() == Some(date) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(date);
    }

    longest
}
