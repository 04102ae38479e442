//! Clock abstraction injected into analytics so calendar-day math can be
//! pinned in tests.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};

pub trait Clock: Send + Sync {
    /// Current instant in UTC.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Offset of the user's local time zone.
    fn local_offset(&self) -> FixedOffset;

    /// Today as a calendar date in the user's local time zone.
    fn today(&self) -> NaiveDate {
        self.now_utc()
            .with_timezone(&self.local_offset())
            .date_naive()
    }

    /// The local calendar day an instant falls on.
    fn local_day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.local_offset()).date_naive()
    }
}

/// Clock backed by the system time and the device time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_offset(&self) -> FixedOffset {
        *Local::now().offset()
    }
}

/// Clock pinned to a fixed instant and offset, for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub now: DateTime<Utc>,
    pub offset: FixedOffset,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self { now, offset }
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.now
    }

    fn local_offset(&self) -> FixedOffset {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn local_day_respects_offset_across_midnight() {
        // 00:30 UTC on the 2nd is still the evening of the 1st at UTC-5.
        let clock = FixedClock::new(
            Utc.with_ymd_and_hms(2026, 3, 2, 0, 30, 0).unwrap(),
            FixedOffset::west_opt(5 * 3600).unwrap(),
        );
        assert_eq!(
            clock.today(),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
        );
    }
}
