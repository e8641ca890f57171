//! Built-in configurable conditions.

use serde::{Deserialize, Serialize};

use super::{ConditionError, ConditionEvaluator, ShellCondition};
use crate::domain::{BuildOutcome, BuildRecord};

/// A condition as written in configuration, tagged by `kind`.
///
/// ```yaml
/// kind: or
/// conditions:
///   - kind: outcome
///     best: unstable
///     worst: failure
///   - kind: shell
///     command: git describe --exact-match HEAD
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RunCondition {
    #[default]
    Always,
    Never,
    /// Outcome lies between `best` and `worst`, inclusive
    Outcome {
        #[serde(default = "default_outcome_bound")]
        worst: BuildOutcome,
        #[serde(default = "default_outcome_bound")]
        best: BuildOutcome,
    },
    Not { condition: Box<RunCondition> },
    /// All must hold; stops at the first no
    And { conditions: Vec<RunCondition> },
    /// Any must hold; stops at the first yes
    Or { conditions: Vec<RunCondition> },
    Shell { command: String },
}

fn default_outcome_bound() -> BuildOutcome {
    BuildOutcome::Success
}

impl ConditionEvaluator for RunCondition {
    fn evaluate(&self, build: &BuildRecord) -> Result<bool, ConditionError> {
        match self {
            RunCondition::Always => Ok(true),
            RunCondition::Never => Ok(false),
            RunCondition::Outcome { worst, best } => {
                Ok(build.outcome >= *best && build.outcome <= *worst)
            }
            RunCondition::Not { condition } => Ok(!condition.evaluate(build)?),
            RunCondition::And { conditions } => {
                for condition in conditions {
                    if !condition.evaluate(build)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            RunCondition::Or { conditions } => {
                for condition in conditions {
                    if condition.evaluate(build)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            RunCondition::Shell { command } => ShellCondition::new(command.as_str()).evaluate(build),
        }
    }

    fn description(&self) -> String {
        match self {
            RunCondition::Always => "always".to_string(),
            RunCondition::Never => "never".to_string(),
            RunCondition::Outcome { worst, best } => format!("outcome between {} and {}", best, worst),
            RunCondition::Not { condition } => format!("not ({})", condition.description()),
            RunCondition::And { conditions } => join_descriptions(conditions, " and "),
            RunCondition::Or { conditions } => join_descriptions(conditions, " or "),
            RunCondition::Shell { command } => format!("shell: {}", command),
        }
    }
}

fn join_descriptions(conditions: &[RunCondition], sep: &str) -> String {
    let parts: Vec<String> = conditions
        .iter()
        .map(|c| format!("({})", c.description()))
        .collect();
    parts.join(sep)
}
