//! Clock port - time source.
//!
//! `SystemClock` in production, `FixedClock` in tests.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use std::sync::Arc;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date at `offset` (the users' local zone).
    fn today(&self, offset: FixedOffset) -> NaiveDate {
        self.now().with_timezone(&offset).date_naive()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    at: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { at }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn today_respects_offset() {
        // 2024-01-04 20:00 UTC is already 2024-01-05 in Seoul (+09:00).
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 4, 20, 0, 0).unwrap());

        let utc = FixedOffset::east_opt(0).unwrap();
        let seoul = FixedOffset::east_opt(9 * 3600).unwrap();

        assert_eq!(clock.today(utc), NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
        assert_eq!(clock.today(seoul), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }
}
