//! Build history access.
//!
//! Policies never own builds. They look builds up by number through a
//! [`BuildHistory`] and follow `previous` links backwards only.

mod job;
mod jsonl;

pub use job::JobHistory;

use crate::domain::{BuildNumber, BuildRecord};
use crate::error::{KeeperError, Result};

/// Read access to a job's builds plus the single retention write.
pub trait BuildHistory {
    /// Look up a build by number.
    fn get(&self, number: BuildNumber) -> Option<&BuildRecord>;

    /// The build immediately preceding `number`, or None for the first build.
    fn previous(&self, number: BuildNumber) -> Option<&BuildRecord>;

    /// Set `keep_forever` on a build. Returns whether the flag changed.
    fn mark_keep_forever(&mut self, number: BuildNumber) -> Result<bool>;

    /// Like [`get`](Self::get) but a missing build is an error.
    fn require(&self, number: BuildNumber) -> Result<&BuildRecord> {
        self.get(number).ok_or(KeeperError::BuildNotFound(number))
    }

    /// Predecessor lookup that refuses links which do not move strictly backwards.
    fn predecessor(&self, number: BuildNumber) -> Result<Option<&BuildRecord>> {
        match self.previous(number) {
            Some(prev) if prev.number >= number => Err(KeeperError::BrokenChain {
                build: number,
                previous: prev.number,
            }),
            other => Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BuildOutcome;
    use chrono::{DateTime, FixedOffset};
    use std::collections::BTreeMap;

    /// History whose links are set by hand, to exercise chain checks.
    struct LinkedHistory {
        builds: BTreeMap<BuildNumber, BuildRecord>,
        links: BTreeMap<BuildNumber, BuildNumber>,
    }

    impl LinkedHistory {
        fn new(numbers: &[BuildNumber]) -> Self {
            let ts: DateTime<FixedOffset> = "2011-07-18T00:00:00+00:00".parse().unwrap();
            let builds = numbers
                .iter()
                .map(|&n| (n, BuildRecord::new(n, ts, BuildOutcome::Success)))
                .collect();
            Self {
                builds,
                links: BTreeMap::new(),
            }
        }

        fn link(mut self, from: BuildNumber, to: BuildNumber) -> Self {
            self.links.insert(from, to);
            self
        }
    }

    impl BuildHistory for LinkedHistory {
        fn get(&self, number: BuildNumber) -> Option<&BuildRecord> {
            self.builds.get(&number)
        }

        fn previous(&self, number: BuildNumber) -> Option<&BuildRecord> {
            self.links.get(&number).and_then(|n| self.builds.get(n))
        }

        fn mark_keep_forever(&mut self, number: BuildNumber) -> Result<bool> {
            let build = self
                .builds
                .get_mut(&number)
                .ok_or(KeeperError::BuildNotFound(number))?;
            Ok(build.keep())
        }
    }

    #[test]
    fn test_require_missing_build() {
        let history = LinkedHistory::new(&[1, 2]);
        assert!(history.require(2).is_ok());
        assert!(matches!(history.require(5), Err(KeeperError::BuildNotFound(5))));
    }

    #[test]
    fn test_predecessor_follows_link() {
        let history = LinkedHistory::new(&[1, 2]).link(2, 1);
        let prev = history.predecessor(2).unwrap().unwrap();
        assert_eq!(prev.number, 1);
        assert!(history.predecessor(1).unwrap().is_none());
    }

    #[test]
    fn test_predecessor_rejects_forward_link() {
        let history = LinkedHistory::new(&[1, 2]).link(1, 2);
        let err = history.predecessor(1).unwrap_err();
        assert!(matches!(err, KeeperError::BrokenChain { build: 1, previous: 2 }));
    }

    #[test]
    fn test_predecessor_rejects_self_link() {
        let history = LinkedHistory::new(&[3]).link(3, 3);
        assert!(history.predecessor(3).is_err());
    }
}
