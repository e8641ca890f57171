//! Shell command condition.
//!
//! Runs `sh -c <command>` with the build described in the environment.
//! Exit status 0 means yes, any other exit code means no.

use std::process::{Command, Stdio};

use super::{ConditionError, ConditionEvaluator};
use crate::domain::BuildRecord;

/// Condition answered by a shell command's exit status
#[derive(Debug, Clone)]
pub struct ShellCondition {
    command: String,
    env: Vec<(String, String)>,
}

impl ShellCondition {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            env: Vec::new(),
        }
    }

    /// Add an environment variable
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    fn execute(&self, build: &BuildRecord) -> std::io::Result<std::process::Output> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(&self.command);
        cmd.env("BUILD_NUMBER", build.number.to_string());
        cmd.env("BUILD_RESULT", build.outcome.as_str().to_uppercase());
        cmd.env("BUILD_TIMESTAMP", build.timestamp.to_rfc3339());

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
        cmd.output()
    }
}

impl ConditionEvaluator for ShellCondition {
    fn evaluate(&self, build: &BuildRecord) -> Result<bool, ConditionError> {
        let output = self.execute(build).map_err(|source| ConditionError::Spawn {
            command: self.command.clone(),
            source,
        })?;

        log::debug!(
            "Condition '{}' for build #{} exited with {:?}: {}",
            self.command,
            build.number,
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim()
        );

        match output.status.code() {
            Some(0) => Ok(true),
            Some(_) => Ok(false),
            None => Err(ConditionError::Terminated {
                command: self.command.clone(),
            }),
        }
    }

    fn description(&self) -> String {
        format!("shell: {}", self.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BuildOutcome;
    use chrono::DateTime;

    fn build(number: u64, outcome: BuildOutcome) -> BuildRecord {
        let ts = DateTime::parse_from_rfc3339("2011-07-18T00:00:00+00:00").unwrap();
        BuildRecord::new(number, ts, outcome)
    }

    #[test]
    fn test_exit_zero_is_true() {
        let cond = ShellCondition::new("true");
        assert!(cond.evaluate(&build(1, BuildOutcome::Success)).unwrap());
    }

    #[test]
    fn test_nonzero_exit_is_false() {
        let cond = ShellCondition::new("exit 3");
        assert!(!cond.evaluate(&build(1, BuildOutcome::Success)).unwrap());
    }

    #[test]
    fn test_build_environment() {
        let cond = ShellCondition::new("test \"$BUILD_NUMBER\" = 42 && test \"$BUILD_RESULT\" = FAILURE");
        assert!(cond.evaluate(&build(42, BuildOutcome::Failure)).unwrap());
        assert!(!cond.evaluate(&build(41, BuildOutcome::Failure)).unwrap());
    }

    #[test]
    fn test_extra_env() {
        let cond = ShellCondition::new("test \"$RELEASE\" = yes").env("RELEASE", "yes");
        assert!(cond.evaluate(&build(1, BuildOutcome::Success)).unwrap());
    }

    #[test]
    fn test_killed_command_is_error() {
        let cond = ShellCondition::new("kill -9 $$");
        let err = cond.evaluate(&build(1, BuildOutcome::Success)).unwrap_err();
        assert!(matches!(err, ConditionError::Terminated { .. }));
    }

    #[test]
    fn test_description() {
        assert_eq!(ShellCondition::new("exit 0").description(), "shell: exit 0");
    }
}
