//! In-memory build history for a single job.

use chrono::{DateTime, FixedOffset};

use super::BuildHistory;
use crate::domain::{BuildNumber, BuildOutcome, BuildRecord};
use crate::error::{KeeperError, Result};

/// Arena of a job's builds ordered by number.
///
/// `previous` is a position lookup: the predecessor of a build is the next
/// older build still present, so rotated-away builds simply drop out of the chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobHistory {
    builds: Vec<BuildRecord>,
}

impl JobHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a history from records in increasing number order
    pub fn from_records(records: impl IntoIterator<Item = BuildRecord>) -> Result<Self> {
        let mut history = Self::new();
        for record in records {
            history.push(record)?;
        }
        Ok(history)
    }

    /// Append a finished build. Numbers must be positive and strictly increasing.
    pub fn push(&mut self, record: BuildRecord) -> Result<()> {
        if record.number == 0 {
            return Err(KeeperError::InvalidConfig("build numbers start at 1".to_string()));
        }
        if let Some(last) = self.builds.last()
            && record.number <= last.number
        {
            return Err(KeeperError::OutOfOrder {
                number: record.number,
                last: last.number,
            });
        }
        self.builds.push(record);
        Ok(())
    }

    /// Append a finished build with the next free number, the way a host assigns them.
    pub fn record(&mut self, outcome: BuildOutcome, timestamp: DateTime<FixedOffset>) -> Result<BuildNumber> {
        let number = self.next_number()?;
        self.builds.push(BuildRecord::new(number, timestamp, outcome));
        Ok(number)
    }

    /// Number the next build will get
    pub fn next_number(&self) -> Result<BuildNumber> {
        match self.builds.last() {
            None => Ok(1),
            Some(last) => last
                .number
                .checked_add(1)
                .ok_or(KeeperError::NumbersExhausted { last: last.number }),
        }
    }

    pub fn len(&self) -> usize {
        self.builds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builds.is_empty()
    }

    /// Most recent build
    pub fn last(&self) -> Option<&BuildRecord> {
        self.builds.last()
    }

    /// Builds oldest first
    pub fn iter(&self) -> impl Iterator<Item = &BuildRecord> {
        self.builds.iter()
    }

    /// Numbers of all builds currently kept forever
    pub fn kept(&self) -> Vec<BuildNumber> {
        self.builds
            .iter()
            .filter(|b| b.keep_forever)
            .map(|b| b.number)
            .collect()
    }

    /// Administrative clear of a retention flag. Policies never call this.
    pub fn release(&mut self, number: BuildNumber) -> Result<bool> {
        let idx = self.position(number).ok_or(KeeperError::BuildNotFound(number))?;
        let build = &mut self.builds[idx];
        let changed = build.keep_forever;
        build.keep_forever = false;
        Ok(changed)
    }

    /// Clear every retention flag, e.g. before replaying a recorded history
    pub fn release_all(&mut self) {
        for build in &mut self.builds {
            build.keep_forever = false;
        }
    }

    fn position(&self, number: BuildNumber) -> Option<usize> {
        self.builds.binary_search_by_key(&number, |b| b.number).ok()
    }
}

impl BuildHistory for JobHistory {
    fn get(&self, number: BuildNumber) -> Option<&BuildRecord> {
        self.position(number).map(|idx| &self.builds[idx])
    }

    fn previous(&self, number: BuildNumber) -> Option<&BuildRecord> {
        let idx = self.position(number)?;
        idx.checked_sub(1).map(|prev| &self.builds[prev])
    }

    fn mark_keep_forever(&mut self, number: BuildNumber) -> Result<bool> {
        let idx = self.position(number).ok_or(KeeperError::BuildNotFound(number))?;
        Ok(self.builds[idx].keep())
    }
}
