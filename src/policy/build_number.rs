//! Keep builds on a fixed cadence of build numbers.

use serde::{Deserialize, Serialize};

use super::{Decision, check_positive, retain_if_allowed};
use crate::domain::BuildNumber;
use crate::error::Result;
use crate::history::BuildHistory;

/// Keeps build #1, #1+period, #1+2*period, ... regardless of earlier decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildNumberPolicy {
    #[serde(default = "default_period")]
    pub period: u32,
    #[serde(default = "default_allow_failures")]
    pub allow_failures: bool,
}

pub(crate) fn default_period() -> u32 {
    10
}

pub(crate) fn default_allow_failures() -> bool {
    true
}

impl Default for BuildNumberPolicy {
    fn default() -> Self {
        Self {
            period: default_period(),
            allow_failures: default_allow_failures(),
        }
    }
}

impl BuildNumberPolicy {
    pub fn new(period: u32, allow_failures: bool) -> Result<Self> {
        check_positive("build-number period", period)?;
        Ok(Self {
            period,
            allow_failures,
        })
    }

    /// Whether `number` falls on the cadence
    pub fn is_scheduled(&self, number: BuildNumber) -> bool {
        number.saturating_sub(1) % u64::from(self.period.max(1)) == 0
    }

    pub fn apply<H: BuildHistory + ?Sized>(&self, history: &mut H, number: BuildNumber) -> Result<Decision> {
        let outcome = history.require(number)?.outcome;
        if !self.is_scheduled(number) {
            return Ok(Decision::Skipped);
        }
        retain_if_allowed(history, number, outcome, self.allow_failures)
    }
}
