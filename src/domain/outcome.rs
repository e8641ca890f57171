//! Build outcome types.
//!
//! Outcomes are totally ordered from best to worst. Retention rules only ever
//! ask whether an outcome is strictly better than [`BuildOutcome::Failure`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Terminal outcome of a build, declared best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildOutcome {
    /// All steps passed
    Success,
    /// Build completed but tests or checks were unstable
    Unstable,
    /// Build failed
    Failure,
    /// Build never ran (e.g. an upstream stage failed)
    NotBuilt,
    /// Build was interrupted
    Aborted,
}

impl BuildOutcome {
    /// Whether `self` ranks strictly better than `other`.
    pub fn is_better_than(self, other: BuildOutcome) -> bool {
        self < other
    }

    /// Whether `self` ranks no better than `other`.
    pub fn is_worse_or_equal_to(self, other: BuildOutcome) -> bool {
        self >= other
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BuildOutcome::Success => "success",
            BuildOutcome::Unstable => "unstable",
            BuildOutcome::Failure => "failure",
            BuildOutcome::NotBuilt => "not_built",
            BuildOutcome::Aborted => "aborted",
        }
    }
}

impl fmt::Display for BuildOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for BuildOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "success" => Ok(BuildOutcome::Success),
            "unstable" => Ok(BuildOutcome::Unstable),
            "failure" => Ok(BuildOutcome::Failure),
            "not_built" | "not-built" => Ok(BuildOutcome::NotBuilt),
            "aborted" => Ok(BuildOutcome::Aborted),
            other => Err(format!("unknown build outcome: {}", other)),
        }
    }
}
