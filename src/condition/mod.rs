//! Run conditions: externally defined yes/no questions about a finished build.
//!
//! [`RunConditionPolicy`](crate::policy::RunConditionPolicy) retains whatever a
//! [`ConditionEvaluator`] says yes to. [`RunCondition`] is the built-in,
//! configurable family of evaluators; hosts may plug in their own.

mod run_condition;
mod shell;

pub use run_condition::RunCondition;
pub use shell::ShellCondition;

use thiserror::Error;

use crate::domain::BuildRecord;

/// Why a condition could not produce an answer
#[derive(Debug, Error)]
pub enum ConditionError {
    /// The command could not be started
    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command was killed before exiting
    #[error("Command '{command}' terminated by signal")]
    Terminated { command: String },

    /// Any other evaluator-specific failure
    #[error("{0}")]
    Other(String),
}

/// Decides whether a build satisfies some external condition
pub trait ConditionEvaluator {
    /// Evaluate against a finished build. May block.
    fn evaluate(&self, build: &BuildRecord) -> Result<bool, ConditionError>;

    /// Short human-readable description
    fn description(&self) -> String {
        "condition".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BuildOutcome;
    use chrono::DateTime;

    struct FixedCondition(bool);

    impl ConditionEvaluator for FixedCondition {
        fn evaluate(&self, _build: &BuildRecord) -> Result<bool, ConditionError> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_default_description() {
        assert_eq!(FixedCondition(true).description(), "condition");
    }

    #[test]
    fn test_trait_object_evaluates() {
        let ts = DateTime::parse_from_rfc3339("2011-07-18T00:00:00+00:00").unwrap();
        let build = BuildRecord::new(1, ts, BuildOutcome::Failure);
        let evaluator: Box<dyn ConditionEvaluator> = Box::new(FixedCondition(false));
        assert!(!evaluator.evaluate(&build).unwrap());
    }

    #[test]
    fn test_error_display() {
        let err = ConditionError::Terminated {
            command: "sleep 60".to_string(),
        };
        assert_eq!(err.to_string(), "Command 'sleep 60' terminated by signal");

        let err = ConditionError::Spawn {
            command: "x".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no sh"),
        };
        assert_eq!(err.to_string(), "Failed to run 'x': no sh");
    }
}
