//! Retention policies.
//!
//! Each policy looks at a just-finished build and the chain of builds before
//! it, then marks at most one of them (the build itself or a single ancestor)
//! as kept forever. Policies hold no state between calls; everything they need
//! is read back from the history, so builds of one job must be handed over in
//! number order, each after its predecessor has been decided.

mod build_number;
mod by_day;
mod keep_first_failed;
mod keep_since;
mod run_condition;

pub use build_number::BuildNumberPolicy;
pub use by_day::{ByDayPolicy, window_start};
pub use keep_first_failed::KeepFirstFailedPolicy;
pub use keep_since::KeepSincePolicy;
pub use run_condition::RunConditionPolicy;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

use crate::domain::{BuildNumber, BuildOutcome};
use crate::error::{KeeperError, Result};
use crate::history::BuildHistory;

/// What a policy did for one finished build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// This build (the trigger or one ancestor) is now kept forever
    Retained(BuildNumber),
    /// An already kept build inside the window makes another one unnecessary
    Covered(BuildNumber),
    /// The rule fired but the trigger's outcome may not be kept
    Blocked,
    /// The rule did not fire
    Skipped,
}

impl Decision {
    /// Build marked by this decision, if any
    pub fn retained(self) -> Option<BuildNumber> {
        match self {
            Decision::Retained(n) => Some(n),
            _ => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Retained(n) => write!(f, "keep #{}", n),
            Decision::Covered(n) => write!(f, "covered by #{}", n),
            Decision::Blocked => f.write_str("not kept (outcome)"),
            Decision::Skipped => f.write_str("-"),
        }
    }
}

/// Whether a build's outcome allows it to be kept.
///
/// True when failures are allowed, or when the outcome is strictly better than
/// a failure (success or unstable).
pub fn should_retain_outcome(outcome: BuildOutcome, allow_failures: bool) -> bool {
    allow_failures || outcome.is_better_than(BuildOutcome::Failure)
}

/// The configured retention rule for a job, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RetentionPolicy {
    BuildNumber(BuildNumberPolicy),
    KeepSince(KeepSincePolicy),
    ByDay(ByDayPolicy),
    KeepFirstFailed(KeepFirstFailedPolicy),
    RunCondition(RunConditionPolicy),
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        RetentionPolicy::KeepSince(KeepSincePolicy::default())
    }
}

impl RetentionPolicy {
    /// Apply the policy to the finished build `number`.
    ///
    /// `console` is the build's own output stream; only run conditions write to it.
    pub fn apply<H: BuildHistory + ?Sized>(
        &self,
        history: &mut H,
        number: BuildNumber,
        console: &mut dyn Write,
    ) -> Result<Decision> {
        match self {
            RetentionPolicy::BuildNumber(p) => p.apply(history, number),
            RetentionPolicy::KeepSince(p) => p.apply(history, number),
            RetentionPolicy::ByDay(p) => p.apply(history, number),
            RetentionPolicy::KeepFirstFailed(p) => p.apply(history, number),
            RetentionPolicy::RunCondition(p) => p.apply(history, number, console),
        }
    }

    /// Reject periods and run lengths below 1.
    pub fn validate(&self) -> Result<()> {
        let (name, value) = match self {
            RetentionPolicy::BuildNumber(p) => ("build-number period", p.period),
            RetentionPolicy::KeepSince(p) => ("keep-since period", p.period),
            RetentionPolicy::ByDay(p) => ("by-day period", p.period),
            RetentionPolicy::KeepFirstFailed(p) => ("keep-first-failed run length", p.run_length),
            RetentionPolicy::RunCondition(_) => return Ok(()),
        };
        check_positive(name, value)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            RetentionPolicy::BuildNumber(_) => "build-number",
            RetentionPolicy::KeepSince(_) => "keep-since",
            RetentionPolicy::ByDay(_) => "by-day",
            RetentionPolicy::KeepFirstFailed(_) => "keep-first-failed",
            RetentionPolicy::RunCondition(_) => "run-condition",
        }
    }
}

impl fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetentionPolicy::BuildNumber(p) => write!(
                f,
                "keep build #1 and one build in every {}{}",
                p.period,
                failures_suffix(p.allow_failures)
            ),
            RetentionPolicy::KeepSince(p) => write!(
                f,
                "keep one build in every {} since the last kept{}",
                p.period,
                failures_suffix(p.allow_failures)
            ),
            RetentionPolicy::ByDay(p) => write!(
                f,
                "keep the first build of every {} day(s){}",
                p.period,
                failures_suffix(p.allow_failures)
            ),
            RetentionPolicy::KeepFirstFailed(p) => write!(
                f,
                "keep the first failure of every run of {} failed builds",
                p.run_length
            ),
            RetentionPolicy::RunCondition(p) => {
                use crate::condition::ConditionEvaluator;
                write!(
                    f,
                    "keep builds matching {}{}",
                    p.condition.description(),
                    if p.keep_on_evaluation_failure {
                        " (or when it cannot be evaluated)"
                    } else {
                        ""
                    }
                )
            }
        }
    }
}

impl From<BuildNumberPolicy> for RetentionPolicy {
    fn from(p: BuildNumberPolicy) -> Self {
        RetentionPolicy::BuildNumber(p)
    }
}

impl From<KeepSincePolicy> for RetentionPolicy {
    fn from(p: KeepSincePolicy) -> Self {
        RetentionPolicy::KeepSince(p)
    }
}

impl From<ByDayPolicy> for RetentionPolicy {
    fn from(p: ByDayPolicy) -> Self {
        RetentionPolicy::ByDay(p)
    }
}

impl From<KeepFirstFailedPolicy> for RetentionPolicy {
    fn from(p: KeepFirstFailedPolicy) -> Self {
        RetentionPolicy::KeepFirstFailed(p)
    }
}

impl From<RunConditionPolicy> for RetentionPolicy {
    fn from(p: RunConditionPolicy) -> Self {
        RetentionPolicy::RunCondition(p)
    }
}

fn failures_suffix(allow_failures: bool) -> &'static str {
    if allow_failures { "" } else { ", skipping failed builds" }
}

pub(crate) fn check_positive(name: &str, value: u32) -> Result<()> {
    if value == 0 {
        return Err(KeeperError::InvalidConfig(format!("{} must be at least 1", name)));
    }
    Ok(())
}

/// Mark `number` kept forever.
pub(crate) fn retain<H: BuildHistory + ?Sized>(history: &mut H, number: BuildNumber) -> Result<Decision> {
    if history.mark_keep_forever(number)? {
        log::info!("Keeping build #{} forever", number);
    }
    Ok(Decision::Retained(number))
}

/// Mark `number` kept forever if its outcome passes [`should_retain_outcome`].
pub(crate) fn retain_if_allowed<H: BuildHistory + ?Sized>(
    history: &mut H,
    number: BuildNumber,
    outcome: BuildOutcome,
    allow_failures: bool,
) -> Result<Decision> {
    if !should_retain_outcome(outcome, allow_failures) {
        log::debug!("Not keeping build #{}: outcome {} is not kept", number, outcome);
        return Ok(Decision::Blocked);
    }
    retain(history, number)
}
