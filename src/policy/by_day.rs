//! Keep the first build of every period of calendar days.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::build_number::default_allow_failures;
use super::{Decision, check_positive, retain_if_allowed};
use crate::domain::BuildNumber;
use crate::error::Result;
use crate::history::BuildHistory;

/// Keeps a build unless a build since midnight `period - 1` days ago is already kept.
///
/// The window is aligned to calendar days in the build's own UTC offset, so
/// how many builds run within a day makes no difference. Failed builds are
/// kept like any other unless `allow_failures` is switched off, in which case
/// the first build of the window that may be kept is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByDayPolicy {
    #[serde(default = "default_days")]
    pub period: u32,
    #[serde(default = "default_allow_failures")]
    pub allow_failures: bool,
}

fn default_days() -> u32 {
    1
}

impl Default for ByDayPolicy {
    fn default() -> Self {
        Self {
            period: default_days(),
            allow_failures: default_allow_failures(),
        }
    }
}

/// Midnight `period - 1` days before the day of `timestamp`, in its offset.
///
/// A period of 0 behaves like 1: the window starts at midnight of the same day.
pub fn window_start(timestamp: DateTime<FixedOffset>, period: u32) -> DateTime<FixedOffset> {
    let offset = timestamp.offset();
    let back = u64::from(period.max(1) - 1);
    let day = timestamp
        .date_naive()
        .checked_sub_days(Days::new(back))
        .unwrap_or(NaiveDate::MIN);
    offset
        .from_local_datetime(&day.and_time(NaiveTime::MIN))
        .single()
        .unwrap_or_else(|| DateTime::<Utc>::MIN_UTC.fixed_offset())
}

impl ByDayPolicy {
    pub fn new(period: u32) -> Result<Self> {
        check_positive("by-day period", period)?;
        Ok(Self {
            period,
            allow_failures: default_allow_failures(),
        })
    }

    pub fn with_allow_failures(mut self, allow_failures: bool) -> Self {
        self.allow_failures = allow_failures;
        self
    }

    pub fn apply<H: BuildHistory + ?Sized>(&self, history: &mut H, number: BuildNumber) -> Result<Decision> {
        let build = history.require(number)?;
        let outcome = build.outcome;
        let cutoff = window_start(build.timestamp, self.period);

        let mut current = number;
        while let Some(prev) = history.predecessor(current)? {
            if prev.timestamp < cutoff {
                break;
            }
            if prev.keep_forever {
                return Ok(Decision::Covered(prev.number));
            }
            current = prev.number;
        }

        retain_if_allowed(history, number, outcome, self.allow_failures)
    }
}
