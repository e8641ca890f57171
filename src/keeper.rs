//! Build keeper - applies the configured retention policy to finished builds.
//!
//! The host calls [`BuildKeeper::on_completed`] once per finished build, in
//! number order per job. A retention problem is logged and never fails the build.

use log::Level;
use std::io::Write;

use crate::domain::BuildNumber;
use crate::error::{KeeperError, Result};
use crate::history::{BuildHistory, JobHistory};
use crate::policy::{Decision, RetentionPolicy};

/// Holds exactly one retention policy for a job
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildKeeper {
    policy: RetentionPolicy,
}

impl BuildKeeper {
    /// Create a keeper, rejecting invalid periods or run lengths.
    pub fn new(policy: impl Into<RetentionPolicy>) -> Result<Self> {
        let policy = policy.into();
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    /// Decide retention for the just-finished build `number`.
    pub fn on_completed<H: BuildHistory + ?Sized>(
        &self,
        history: &mut H,
        number: BuildNumber,
        console: &mut dyn Write,
    ) -> Decision {
        match self.policy.apply(history, number, console) {
            Ok(decision) => {
                log::debug!("{} policy on build #{}: {}", self.policy.kind(), number, decision);
                decision
            }
            Err(err) => {
                log::log!(
                    failure_level(&err),
                    "Could not apply {} policy to build #{}: {}",
                    self.policy.kind(),
                    number,
                    err
                );
                Decision::Skipped
            }
        }
    }

    /// Feed every build of `history` through the policy, oldest first.
    pub fn replay(&self, history: &mut JobHistory, console: &mut dyn Write) -> Vec<(BuildNumber, Decision)> {
        let numbers: Vec<BuildNumber> = history.iter().map(|b| b.number).collect();
        numbers
            .into_iter()
            .map(|n| (n, self.on_completed(history, n, console)))
            .collect()
    }
}

/// A broken chain means the host's history is corrupt; everything else is routine.
fn failure_level(err: &KeeperError) -> Level {
    match err {
        KeeperError::BrokenChain { .. } => Level::Error,
        _ => Level::Warn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BuildOutcome, BuildRecord};
    use crate::policy::{BuildNumberPolicy, ByDayPolicy, KeepFirstFailedPolicy};
    use chrono::DateTime;

    fn history(outcomes: &[BuildOutcome]) -> JobHistory {
        let ts = DateTime::parse_from_rfc3339("2011-07-18T10:00:00+00:00").unwrap();
        let mut history = JobHistory::new();
        for &outcome in outcomes {
            history.record(outcome, ts).unwrap();
        }
        history
    }

    #[test]
    fn test_new_rejects_invalid_policy() {
        assert!(BuildKeeper::new(ByDayPolicy { period: 0, allow_failures: true }).is_err());
        assert!(BuildKeeper::new(ByDayPolicy::new(2).unwrap()).is_ok());
    }

    #[test]
    fn test_default_keeper() {
        let keeper = BuildKeeper::default();
        assert_eq!(keeper.policy().kind(), "keep-since");
    }

    #[test]
    fn test_missing_build_is_skipped() {
        let keeper = BuildKeeper::default();
        let mut history = JobHistory::new();
        let mut console = Vec::new();
        assert_eq!(keeper.on_completed(&mut history, 12, &mut console), Decision::Skipped);
    }

    /// History whose only build names itself as its predecessor
    struct SelfLinked(BuildRecord);

    impl BuildHistory for SelfLinked {
        fn get(&self, number: BuildNumber) -> Option<&BuildRecord> {
            (number == self.0.number).then_some(&self.0)
        }

        fn previous(&self, number: BuildNumber) -> Option<&BuildRecord> {
            self.get(number)
        }

        fn mark_keep_forever(&mut self, number: BuildNumber) -> Result<bool> {
            if number != self.0.number {
                return Err(KeeperError::BuildNotFound(number));
            }
            Ok(self.0.keep())
        }
    }

    #[test]
    fn test_broken_chain_is_skipped() {
        let ts = DateTime::parse_from_rfc3339("2011-07-18T10:00:00+00:00").unwrap();
        let mut history = SelfLinked(BuildRecord::new(3, ts, BuildOutcome::Success));
        let keeper = BuildKeeper::default();
        let mut console = Vec::new();

        assert_eq!(keeper.on_completed(&mut history, 3, &mut console), Decision::Skipped);
        assert!(!history.0.keep_forever);
    }

    #[test]
    fn test_failure_level() {
        let broken = KeeperError::BrokenChain { build: 3, previous: 3 };
        assert_eq!(failure_level(&broken), Level::Error);
        assert_eq!(failure_level(&KeeperError::BuildNotFound(12)), Level::Warn);
        assert_eq!(
            failure_level(&KeeperError::InvalidConfig("period".to_string())),
            Level::Warn
        );
    }

    #[test]
    fn test_replay_example_sequence() {
        use BuildOutcome::{Failure as F, Success as S};
        let keeper = BuildKeeper::new(KeepFirstFailedPolicy { run_length: 3 }).unwrap();
        let mut history = history(&[S, S, F, F, F, S]);
        let mut console = Vec::new();
        let decisions = keeper.replay(&mut history, &mut console);

        assert_eq!(decisions.len(), 6);
        assert_eq!(decisions[4], (5, Decision::Retained(3)));
        assert_eq!(history.kept(), vec![3]);
    }

    #[test]
    fn test_replay_twice_is_idempotent() {
        let keeper = BuildKeeper::new(BuildNumberPolicy {
            period: 3,
            allow_failures: true,
        })
        .unwrap();
        let mut history = history(&[BuildOutcome::Success; 4]);
        let mut console = Vec::new();
        keeper.replay(&mut history, &mut console);
        let first = history.kept();
        keeper.replay(&mut history, &mut console);
        assert_eq!(history.kept(), first);
        assert_eq!(first, vec![1, 4]);
    }
}
