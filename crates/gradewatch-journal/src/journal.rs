// crates/gradewatch-journal/src/journal.rs
// ============================================================================
// Module: NDJSON Change Journal
// Description: Append-only, newline-delimited ChangeReport log with retention pruning.
// Purpose: Implement the §4.D change journal contract.
// Dependencies: gradewatch-core, serde_json
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io::BufRead;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use gradewatch_core::core::ChangeReport;
use gradewatch_core::interfaces::ChangeJournal;
use gradewatch_core::interfaces::JournalError;
use gradewatch_core::interfaces::JournalNotifyResults;
use gradewatch_core::interfaces::JournalRecord;
use serde::Deserialize;
use serde::Serialize;
use time::Duration;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default retention horizon, per spec §4.D.
pub const DEFAULT_RETENTION_DAYS: i64 = 90;

// ============================================================================
// SECTION: Entry
// ============================================================================

/// One NDJSON line: a change report, its summary sentence, and the
/// per-provider notification results recorded alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// The change report this entry describes.
    pub report: ChangeReport,
    /// Rendered `counts.summary_sentence()`, stored for cheap reading without
    /// recomputation.
    pub summary: String,
    /// Per-provider notification outcome; empty when notification was skipped.
    pub notify_results: JournalNotifyResults,
    /// Set when this entry documents a fetch failure rather than a completed
    /// diff.
    pub error: Option<String>,
}

// ============================================================================
// SECTION: Journal
// ============================================================================

/// An append-only, newline-delimited [`ChangeJournal`] at `path`. Each
/// successful `append` is flushed before returning so a crash immediately
/// after `send` cannot silently lose a record.
pub struct NdjsonChangeJournal {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
    retention: Duration,
}

impl NdjsonChangeJournal {
    /// Opens (creating if absent) the journal file at `path` and prunes
    /// entries older than `retention_days`, per spec §4.D ("on open, prune
    /// entries older than the horizon").
    ///
    /// # Errors
    ///
    /// Returns [`JournalError`] if the file cannot be opened or pruned.
    pub fn open(path: &Path, retention_days: i64) -> Result<Self, JournalError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| JournalError::Io(err.to_string()))?;
        let journal = Self {
            path: path.to_owned(),
            writer: Mutex::new(BufWriter::new(file)),
            retention: Duration::days(retention_days),
        };
        journal.prune(OffsetDateTime::now_utc())?;
        Ok(journal)
    }
}

impl ChangeJournal for NdjsonChangeJournal {
    fn append(&self, record: &JournalRecord<'_>) -> Result<(), JournalError> {
        let entry = JournalEntry {
            report: record.report.clone(),
            summary: record.report.counts.summary_sentence(),
            notify_results: record.notify_results.clone(),
            error: record.error.map(ToOwned::to_owned),
        };
        let line = serde_json::to_string(&entry).map_err(|err| JournalError::Io(err.to_string()))?;
        let mut writer = self.writer.lock().map_err(|_| JournalError::Io("journal writer mutex poisoned".to_owned()))?;
        writeln!(writer, "{line}").map_err(|err| JournalError::Io(err.to_string()))?;
        writer.flush().map_err(|err| JournalError::Io(err.to_string()))
    }

    fn prune(&self, now: OffsetDateTime) -> Result<(), JournalError> {
        let horizon = now - self.retention;
        let existing = std::fs::read(&self.path).map_err(|err| JournalError::Io(err.to_string()))?;
        let reader = BufReader::new(existing.as_slice());
        let mut kept = Vec::new();
        for line in reader.lines() {
            let line = line.map_err(|err| JournalError::Io(err.to_string()))?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<JournalEntry>(&line) {
                Ok(entry) if entry.report.timestamp >= horizon => kept.push(line),
                Ok(_) => {}
                Err(_) => kept.push(line),
            }
        }

        let file =
            OpenOptions::new().write(true).truncate(true).open(&self.path).map_err(|err| JournalError::Io(err.to_string()))?;
        let mut writer = BufWriter::new(file);
        for line in &kept {
            writeln!(writer, "{line}").map_err(|err| JournalError::Io(err.to_string()))?;
        }
        writer.flush().map_err(|err| JournalError::Io(err.to_string()))?;

        let reopened = OpenOptions::new().create(true).append(true).open(&self.path).map_err(|err| JournalError::Io(err.to_string()))?;
        let mut guard = self.writer.lock().map_err(|_| JournalError::Io("journal writer mutex poisoned".to_owned()))?;
        *guard = BufWriter::new(reopened);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use gradewatch_core::core::ChangeCounts;

    use super::*;

    fn report(timestamp: OffsetDateTime) -> ChangeReport {
        ChangeReport { timestamp, changes: Vec::new(), counts: ChangeCounts::default(), is_initial: false }
    }

    #[test]
    fn append_then_reopen_prunes_entries_past_the_horizon() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.ndjson");

        {
            let journal = NdjsonChangeJournal::open(&path, 90).unwrap();
            let old = report(OffsetDateTime::now_utc() - Duration::days(200));
            let recent = report(OffsetDateTime::now_utc() - Duration::days(1));
            let notify_results = BTreeMap::new();
            journal.append(&JournalRecord { report: &old, notify_results: &notify_results, error: None }).unwrap();
            journal.append(&JournalRecord { report: &recent, notify_results: &notify_results, error: None }).unwrap();
        }

        let reopened = NdjsonChangeJournal::open(&path, 90).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 1, "the 200-day-old entry must be pruned on open");

        let notify_results = BTreeMap::new();
        let fresh = report(OffsetDateTime::now_utc());
        reopened.append(&JournalRecord { report: &fresh, notify_results: &notify_results, error: None }).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn prune_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.ndjson");
        let journal = NdjsonChangeJournal::open(&path, 90).unwrap();
        let notify_results = BTreeMap::new();
        let entry = report(OffsetDateTime::now_utc());
        journal.append(&JournalRecord { report: &entry, notify_results: &notify_results, error: None }).unwrap();

        journal.prune(OffsetDateTime::now_utc()).unwrap();
        journal.prune(OffsetDateTime::now_utc()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);
    }
}
