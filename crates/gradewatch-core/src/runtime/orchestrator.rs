// crates/gradewatch-core/src/runtime/orchestrator.rs
// ============================================================================
// Module: Pipeline Orchestrator
// Description: Composes fetch -> diff -> notify -> journal -> persist for one cycle.
// Purpose: Implement the §4.G six-step contract with partial-failure tolerance.
// Dependencies: crate::core, crate::interfaces, crate::runtime::differ, crate::runtime::notify_manager
// ============================================================================

//! ## Overview
//! `run_cycle` is generic over every collaborator trait so it can be driven
//! in tests against fakes, with the real SQLite store, HTTP fetcher, and
//! notification transports wired in only at the process entry point.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use time::Duration;
use time::OffsetDateTime;

use crate::core::ChangeCounts;
use crate::core::ChangeReport;
use crate::core::NotificationMessage;
use crate::core::model::Snapshot;
use crate::interfaces::ChangeJournal;
use crate::interfaces::HealthPing;
use crate::interfaces::JournalNotifyResults;
use crate::interfaces::JournalRecord;
use crate::interfaces::NotificationProvider;
use crate::interfaces::NotifyResults;
use crate::interfaces::SnapshotFetcher;
use crate::interfaces::SnapshotStore;
use crate::runtime::differ;
use crate::runtime::notify_manager;

// ============================================================================
// SECTION: Retry Configuration
// ============================================================================

/// Fetch retry policy, per `retry.max_attempts`/`retry.delay_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum fetch attempts (default 3).
    pub max_attempts: u32,
    /// Delay between attempts (default 5 seconds).
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::seconds(5),
        }
    }
}

// ============================================================================
// SECTION: Cycle Result
// ============================================================================

/// The per-cycle outcome, per §4.G.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleResult {
    /// Fetch and persist succeeded; the diff contained no changes.
    OkNoChanges,
    /// Fetch and persist succeeded; the diff contained changes (all reported).
    OkChanges,
    /// All fetch attempts failed.
    FetchFailed,
    /// Fetch succeeded but the store could not be persisted.
    PersistFailed,
    /// Fetch and persist both succeeded but notification or the journal
    /// reported at least one failure.
    Partial,
}

impl std::fmt::Display for CycleResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::OkNoChanges => "ok_no_changes",
            Self::OkChanges => "ok_changes",
            Self::FetchFailed => "fetch_failed",
            Self::PersistFailed => "persist_failed",
            Self::Partial => "partial",
        };
        f.write_str(label)
    }
}

/// The full result of one cycle, for logging and tests.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    /// The categorical result.
    pub result: CycleResult,
    /// The change report, when a diff was computed.
    pub report: Option<ChangeReport>,
    /// Per-provider notification results, when notification ran.
    pub notify_results: NotifyResults,
}

// ============================================================================
// SECTION: Run Cycle
// ============================================================================

/// Drives one pipeline cycle, per §4.G.
///
/// `sleep` is invoked between fetch retries; production callers pass
/// `std::thread::sleep`, tests pass a no-op or recording closure.
pub fn run_cycle(
    fetcher: &dyn SnapshotFetcher,
    store: &dyn SnapshotStore,
    active_providers: &[Box<dyn NotificationProvider>],
    journal: &dyn ChangeJournal,
    health: &dyn HealthPing,
    retry: &RetryConfig,
    sleep: &dyn Fn(std::time::Duration),
) -> CycleOutcome {
    let snapshot = match fetch_with_retry(fetcher, retry, sleep) {
        Ok(snapshot) => snapshot,
        Err(_) => {
            let error_text = "the grade service could not be reached after retrying";
            let error_message = NotificationMessage::pipeline_error(error_text.to_owned());
            let notify_results = notify_manager::dispatch(active_providers, error_message);
            let _ = health.ping(false);

            let error_report = ChangeReport {
                timestamp: OffsetDateTime::now_utc(),
                changes: Vec::new(),
                counts: ChangeCounts::default(),
                is_initial: false,
            };
            let record = JournalRecord {
                report: &error_report,
                notify_results: &notify_results,
                error: Some(error_text),
            };
            let _ = journal.append(&record);

            return CycleOutcome {
                result: CycleResult::FetchFailed,
                report: None,
                notify_results,
            };
        }
    };

    let report = differ::diff(&snapshot, store);

    let notify_results = if report.is_initial || report.is_empty() {
        NotifyResults::new()
    } else {
        let message = build_changes_message(&report);
        notify_manager::dispatch(active_providers, message)
    };

    let journal_ok = if report.is_initial || report.is_empty() {
        true
    } else {
        write_journal(journal, &report, &notify_results)
    };

    let persisted = persist(store, &snapshot);

    let _ = health.ping(persisted);

    let result = classify_result(&report, persisted, journal_ok, &notify_results);
    CycleOutcome {
        result,
        report: Some(report),
        notify_results,
    }
}

fn fetch_with_retry(
    fetcher: &dyn SnapshotFetcher,
    retry: &RetryConfig,
    sleep: &dyn Fn(std::time::Duration),
) -> Result<Snapshot, ()> {
    let mut attempts_left = retry.max_attempts.max(1);
    loop {
        match fetcher.fetch() {
            Ok(snapshot) => return Ok(snapshot),
            Err(_) if attempts_left > 1 => {
                attempts_left -= 1;
                sleep(std::time::Duration::from_secs(
                    u64::try_from(retry.delay.whole_seconds().max(0)).unwrap_or(0),
                ));
            }
            Err(_) => return Err(()),
        }
    }
}

fn build_changes_message(report: &ChangeReport) -> NotificationMessage {
    let mut metadata = BTreeMap::new();
    metadata.insert("new_assignments".to_owned(), report.counts.new_assignments.to_string());
    metadata.insert("grade_updates".to_owned(), report.counts.grade_updates.to_string());
    metadata.insert("comment_updates".to_owned(), report.counts.comment_updates.to_string());
    NotificationMessage::changes_detected(report.counts.summary_sentence(), metadata)
}

/// Appends the report to the journal. Per §4.D, a journal write failure
/// never fails the pipeline; the implementation is expected to log it at
/// warning level internally. The orchestrator only tracks whether it
/// succeeded, to feed the `Partial` classification in [`classify_result`].
fn write_journal(journal: &dyn ChangeJournal, report: &ChangeReport, notify_results: &NotifyResults) -> bool {
    let notify_results: JournalNotifyResults = notify_results.clone();
    let record = JournalRecord {
        report,
        notify_results: &notify_results,
        error: None,
    };
    journal.append(&record).is_ok()
}

fn persist(store: &dyn SnapshotStore, snapshot: &Snapshot) -> bool {
    store.replace_all(snapshot).is_ok()
}

fn classify_result(
    report: &ChangeReport,
    persisted: bool,
    journal_ok: bool,
    notify_results: &NotifyResults,
) -> CycleResult {
    if !persisted {
        return CycleResult::PersistFailed;
    }
    let any_notify_failure = notify_results.values().any(|ok| !ok);
    if any_notify_failure || !journal_ok {
        return CycleResult::Partial;
    }
    if report.is_initial || report.is_empty() {
        CycleResult::OkNoChanges
    } else {
        CycleResult::OkChanges
    }
}
