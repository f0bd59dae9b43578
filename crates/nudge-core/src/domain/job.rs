//! Job kinds: which notification a run produces.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    /// One notification per open task due tomorrow.
    TomorrowReminder,
    /// One aggregated notification per subscriber for today's pending tasks.
    DailyDigest,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::TomorrowReminder => "tomorrow-reminder",
            JobKind::DailyDigest => "daily-digest",
        }
    }

    /// The calendar date a run of this job looks at, given local `today`.
    pub fn target_date(&self, today: NaiveDate) -> NaiveDate {
        match self {
            // saturates at NaiveDate::MAX, a date no stored task carries
            JobKind::TomorrowReminder => today
                .checked_add_days(Days::new(1))
                .unwrap_or(NaiveDate::MAX),
            JobKind::DailyDigest => today,
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
