//! JSONL persistence for a job history, one build per line.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use super::JobHistory;
use crate::domain::BuildRecord;
use crate::error::Result;

impl JobHistory {
    /// Load a history from a JSONL file. Blank lines are ignored.
    pub fn load_jsonl(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::new(file);
        let mut history = JobHistory::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: BuildRecord = serde_json::from_str(&line)?;
            history.push(record)?;
        }
        log::debug!("Loaded {} builds from {}", history.len(), path.as_ref().display());
        Ok(history)
    }

    /// Rewrite the whole history to a JSONL file.
    pub fn save_jsonl(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path.as_ref())?;
        for record in self.iter() {
            writeln!(file, "{}", serde_json::to_string(record)?)?;
        }
        Ok(())
    }
}
