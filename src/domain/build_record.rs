//! Build record
//!
//! One finished execution of a job. Everything except `keep_forever` is fixed
//! once the build reaches its terminal outcome.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::outcome::BuildOutcome;

/// Sequence number assigned by the host, strictly increasing per job
pub type BuildNumber = u64;

/// A completed build of a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRecord {
    //=== Identity ===
    /// Sequence number within the job (starts at 1)
    pub number: BuildNumber,

    /// When the build started, in the offset the host recorded it in
    pub timestamp: DateTime<FixedOffset>,

    //=== Result ===
    /// Terminal outcome
    pub outcome: BuildOutcome,

    //=== Retention ===
    /// Exempt from log/artifact rotation
    #[serde(default)]
    pub keep_forever: bool,
}

impl BuildRecord {
    /// Create a record for a finished build that has not been retained yet
    pub fn new(number: BuildNumber, timestamp: DateTime<FixedOffset>, outcome: BuildOutcome) -> Self {
        Self {
            number,
            timestamp,
            outcome,
            keep_forever: false,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.outcome == BuildOutcome::Failure
    }

    /// Mark the build kept. Returns false if it already was.
    pub fn keep(&mut self) -> bool {
        let changed = !self.keep_forever;
        self.keep_forever = true;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2011, 7, 18, 12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_new_build_is_not_kept() {
        let build = BuildRecord::new(1, ts(), BuildOutcome::Success);
        assert_eq!(build.number, 1);
        assert!(!build.keep_forever);
        assert!(!build.is_failure());
    }

    #[test]
    fn test_keep_is_idempotent() {
        let mut build = BuildRecord::new(4, ts(), BuildOutcome::Failure);
        assert!(build.is_failure());
        assert!(build.keep());
        assert!(!build.keep());
        assert!(build.keep_forever);
    }

    #[test]
    fn test_serde_defaults_keep_forever() {
        let json = r#"{"number":3,"timestamp":"2011-07-18T12:00:00+01:00","outcome":"unstable"}"#;
        let build: BuildRecord = serde_json::from_str(json).unwrap();
        assert_eq!(build.number, 3);
        assert_eq!(build.outcome, BuildOutcome::Unstable);
        assert_eq!(build.timestamp, ts());
        assert!(!build.keep_forever);
    }

    #[test]
    fn test_serde_preserves_offset() {
        let build = BuildRecord::new(9, ts(), BuildOutcome::Aborted);
        let json = serde_json::to_string(&build).unwrap();
        assert!(json.contains("+01:00"));
        let restored: BuildRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.timestamp.offset(), build.timestamp.offset());
    }
}
