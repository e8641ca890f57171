//! Keep builds an external condition says yes to.

use serde::{Deserialize, Serialize};
use std::io::Write;

use super::{Decision, retain};
use crate::condition::{ConditionError, ConditionEvaluator, RunCondition};
use crate::domain::BuildNumber;
use crate::error::Result;
use crate::history::BuildHistory;

/// Keeps the build when the condition holds, whatever its outcome.
///
/// A condition that fails to evaluate is reported on the build's console and
/// resolved by `keep_on_evaluation_failure`; it never fails the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConditionPolicy {
    pub condition: RunCondition,
    #[serde(default)]
    pub keep_on_evaluation_failure: bool,
}

impl RunConditionPolicy {
    pub fn new(condition: RunCondition, keep_on_evaluation_failure: bool) -> Self {
        Self {
            condition,
            keep_on_evaluation_failure,
        }
    }

    /// Apply using the configured condition
    pub fn apply<H: BuildHistory + ?Sized>(
        &self,
        history: &mut H,
        number: BuildNumber,
        console: &mut dyn Write,
    ) -> Result<Decision> {
        self.apply_with(&self.condition, history, number, console)
    }

    /// Apply using a host-supplied evaluator in place of the configured condition
    pub fn apply_with<E, H>(
        &self,
        evaluator: &E,
        history: &mut H,
        number: BuildNumber,
        console: &mut dyn Write,
    ) -> Result<Decision>
    where
        E: ConditionEvaluator + ?Sized,
        H: BuildHistory + ?Sized,
    {
        let build = history.require(number)?;
        match evaluator.evaluate(build) {
            Ok(true) => retain(history, number),
            Ok(false) => Ok(Decision::Skipped),
            Err(err) => {
                log::warn!(
                    "Failed to evaluate {} for build #{}: {}",
                    evaluator.description(),
                    number,
                    err
                );
                if let Err(io_err) = report_failure(console, &err) {
                    log::warn!("Could not write to console of build #{}: {}", number, io_err);
                }
                if self.keep_on_evaluation_failure {
                    retain(history, number)
                } else {
                    Ok(Decision::Skipped)
                }
            }
        }
    }
}

fn report_failure(console: &mut dyn Write, err: &ConditionError) -> std::io::Result<()> {
    writeln!(console, "[build-keeper] Failed to evaluate the run condition")?;
    writeln!(console, "[build-keeper] {}", err)
}
