//! Keep one build per window counted from the last kept build.

use serde::{Deserialize, Serialize};

use super::build_number::{default_allow_failures, default_period};
use super::{Decision, check_positive, retain_if_allowed};
use crate::domain::BuildNumber;
use crate::error::Result;
use crate::history::BuildHistory;

/// Keeps a build unless one of the previous `period - 1` builds is already kept.
///
/// Unlike [`BuildNumberPolicy`](super::BuildNumberPolicy) the window re-anchors
/// on whichever build was kept last, so a build skipped for failing is made up
/// for by the next build that may be kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeepSincePolicy {
    #[serde(default = "default_period")]
    pub period: u32,
    #[serde(default = "default_allow_failures")]
    pub allow_failures: bool,
}

impl Default for KeepSincePolicy {
    fn default() -> Self {
        Self {
            period: default_period(),
            allow_failures: default_allow_failures(),
        }
    }
}

impl KeepSincePolicy {
    pub fn new(period: u32, allow_failures: bool) -> Result<Self> {
        check_positive("keep-since period", period)?;
        Ok(Self {
            period,
            allow_failures,
        })
    }

    pub fn apply<H: BuildHistory + ?Sized>(&self, history: &mut H, number: BuildNumber) -> Result<Decision> {
        let outcome = history.require(number)?.outcome;

        let mut current = number;
        for _ in 0..self.period.saturating_sub(1) {
            let Some(prev) = history.predecessor(current)? else {
                break;
            };
            if prev.keep_forever {
                return Ok(Decision::Covered(prev.number));
            }
            current = prev.number;
        }

        retain_if_allowed(history, number, outcome, self.allow_failures)
    }
}
