//! Keep the first failure of a long enough run of failures.

use serde::{Deserialize, Serialize};

use super::{Decision, check_positive, retain};
use crate::domain::BuildNumber;
use crate::error::Result;
use crate::history::BuildHistory;

/// Once `run_length` consecutive builds have failed, keeps the first of them.
///
/// Only the build that starts a run is ever kept, and only at the moment the
/// run reaches `run_length` failures. Later failures of the same run find a
/// failed build before their candidate and leave the history alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeepFirstFailedPolicy {
    #[serde(alias = "number_of_fails")]
    pub run_length: u32,
}

impl KeepFirstFailedPolicy {
    pub fn new(run_length: u32) -> Result<Self> {
        check_positive("keep-first-failed run length", run_length)?;
        Ok(Self { run_length })
    }

    pub fn apply<H: BuildHistory + ?Sized>(&self, history: &mut H, number: BuildNumber) -> Result<Decision> {
        if !history.require(number)?.is_failure() {
            return Ok(Decision::Skipped);
        }

        let mut first = number;
        for _ in 1..self.run_length {
            match history.predecessor(first)? {
                Some(prev) if prev.is_failure() => first = prev.number,
                _ => return Ok(Decision::Skipped),
            }
        }

        // The run started earlier and was handled when it reached run_length.
        if matches!(history.predecessor(first)?, Some(prev) if prev.is_failure()) {
            return Ok(Decision::Skipped);
        }

        log::debug!(
            "Build #{} completes a run of {} failures starting at #{}",
            number,
            self.run_length,
            first
        );
        retain(history, first)
    }
}
