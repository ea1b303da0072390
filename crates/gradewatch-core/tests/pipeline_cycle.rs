// crates/gradewatch-core/tests/pipeline_cycle.rs
// ============================================================================
// Module: Pipeline Cycle Integration Tests
// Description: End-to-end run_cycle tests against in-memory fakes, including notification fan-out.
// Purpose: Exercise §4.G across two real cycles, the way the CLI would drive it.
// ============================================================================

#![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use gradewatch_core::core::AssignmentId;
use gradewatch_core::core::Category;
use gradewatch_core::core::CategoryId;
use gradewatch_core::core::Exception;
use gradewatch_core::core::NotificationMessage;
use gradewatch_core::core::Period;
use gradewatch_core::core::PeriodId;
use gradewatch_core::core::Section;
use gradewatch_core::core::SectionId;
use gradewatch_core::core::Snapshot;
use gradewatch_core::core::model::Assignment;
use gradewatch_core::interfaces::AssignmentContext;
use gradewatch_core::interfaces::ChangeJournal;
use gradewatch_core::interfaces::FetchError;
use gradewatch_core::interfaces::HealthPing;
use gradewatch_core::interfaces::HealthPingError;
use gradewatch_core::interfaces::JournalError;
use gradewatch_core::interfaces::JournalRecord;
use gradewatch_core::interfaces::NotificationProvider;
use gradewatch_core::interfaces::SnapshotFetcher;
use gradewatch_core::interfaces::SnapshotStore;
use gradewatch_core::interfaces::StoreError;
use gradewatch_core::runtime::CycleResult;
use gradewatch_core::runtime::RetryConfig;
use gradewatch_core::runtime::run_cycle;
use time::OffsetDateTime;
use time::macros::datetime;

struct ScriptedFetcher(RefCell<Vec<Snapshot>>);

impl SnapshotFetcher for ScriptedFetcher {
    fn fetch(&self) -> Result<Snapshot, FetchError> {
        let mut snapshots = self.0.borrow_mut();
        if snapshots.is_empty() {
            return Err(FetchError::Transport("exhausted fixtures".to_owned()));
        }
        Ok(snapshots.remove(0))
    }
}

#[derive(Default)]
struct MemoryStore {
    timestamp: RefCell<Option<OffsetDateTime>>,
    assignments: RefCell<BTreeMap<String, AssignmentContext>>,
}

impl SnapshotStore for MemoryStore {
    fn latest_timestamp(&self) -> Result<Option<OffsetDateTime>, StoreError> {
        Ok(*self.timestamp.borrow())
    }

    fn get_assignment(&self, id: &AssignmentId) -> Result<Option<AssignmentContext>, StoreError> {
        Ok(self.assignments.borrow().get(id.as_str()).cloned())
    }

    fn get_category(&self, _category_id: &CategoryId, _period_id: &PeriodId) -> Result<Option<Category>, StoreError> {
        Ok(None)
    }

    fn iter_assignments(&self) -> Result<Vec<AssignmentContext>, StoreError> {
        Ok(self.assignments.borrow().values().cloned().collect())
    }

    fn replace_all(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let mut assignments = self.assignments.borrow_mut();
        assignments.clear();
        for (section, period, category, assignment) in snapshot.iter_assignments_sorted() {
            assignments.insert(
                assignment.assignment_id.as_str().to_owned(),
                AssignmentContext {
                    section_title: section.section_title.clone(),
                    period_name: period.name.clone(),
                    category_name: category.name.clone(),
                    assignment: assignment.clone(),
                },
            );
        }
        *self.timestamp.borrow_mut() = Some(snapshot.timestamp);
        Ok(())
    }

    fn clear_all(&self) -> Result<(), StoreError> {
        self.assignments.borrow_mut().clear();
        *self.timestamp.borrow_mut() = None;
        Ok(())
    }
}

#[derive(Default)]
struct RecordingJournal {
    entries: RefCell<Vec<usize>>,
}

impl ChangeJournal for RecordingJournal {
    fn append(&self, record: &JournalRecord<'_>) -> Result<(), JournalError> {
        self.entries.borrow_mut().push(record.report.changes.len());
        Ok(())
    }

    fn prune(&self, _now: OffsetDateTime) -> Result<(), JournalError> {
        Ok(())
    }
}

struct SpyProvider {
    sent: RefCell<Vec<String>>,
}

impl NotificationProvider for SpyProvider {
    fn name(&self) -> &str {
        "spy"
    }

    fn available(&self) -> bool {
        true
    }

    fn send(&self, message: &NotificationMessage) -> bool {
        self.sent.borrow_mut().push(message.content.clone());
        true
    }
}

struct NoopHealth;

impl HealthPing for NoopHealth {
    fn ping(&self, _success: bool) -> Result<(), HealthPingError> {
        Ok(())
    }
}

fn assignment(id: &str, earned: &str) -> Assignment {
    Assignment {
        assignment_id: AssignmentId::new(id),
        title: "Essay".to_owned(),
        earned_points: Some(BigDecimal::from_str(earned).unwrap()),
        max_points: Some(BigDecimal::from_str("10").unwrap()),
        exception: Exception::None,
        comment: None,
        due_date: None,
    }
}

fn snapshot(timestamp: OffsetDateTime, earned: &str) -> Snapshot {
    Snapshot {
        timestamp,
        sections: vec![Section {
            section_id: SectionId::new("s1"),
            course_title: "English".to_owned(),
            section_title: "Period 1".to_owned(),
            periods: vec![Period {
                period_id: PeriodId::new("p1"),
                name: "Q1".to_owned(),
                categories: vec![Category {
                    category_id: CategoryId::new("c1"),
                    name: "Essays".to_owned(),
                    weight: None,
                    assignments: vec![assignment("a1", earned)],
                }],
            }],
        }],
    }
}

#[test]
fn initial_cycle_is_silent_then_grade_change_notifies_and_journals() {
    let fetcher = ScriptedFetcher(RefCell::new(vec![
        snapshot(datetime!(2026-01-01 09:00 UTC), "10"),
        snapshot(datetime!(2026-01-02 09:00 UTC), "7"),
    ]));
    let store = MemoryStore::default();
    let journal = RecordingJournal::default();
    let health = NoopHealth;
    let spy = Box::new(SpyProvider { sent: RefCell::new(Vec::new()) });
    let providers: Vec<Box<dyn NotificationProvider>> = vec![spy];
    let retry = RetryConfig::default();

    let first = run_cycle(&fetcher, &store, &providers, &journal, &health, &retry, &|_| {});
    assert_eq!(first.result, CycleResult::OkNoChanges);
    assert!(first.report.unwrap().is_initial);
    assert!(journal.entries.borrow().is_empty(), "initial report is never journaled");

    let second = run_cycle(&fetcher, &store, &providers, &journal, &health, &retry, &|_| {});
    assert_eq!(second.result, CycleResult::OkChanges);
    let report = second.report.unwrap();
    assert_eq!(report.counts.grade_updates, 1);
    assert_eq!(journal.entries.borrow().as_slice(), &[1]);
    assert_eq!(second.notify_results.get("spy"), Some(&true));
}

#[test]
fn no_op_resubmission_skips_notification_and_journal() {
    let fetcher = ScriptedFetcher(RefCell::new(vec![
        snapshot(datetime!(2026-01-01 09:00 UTC), "10"),
        snapshot(datetime!(2026-01-02 09:00 UTC), "10"),
    ]));
    let store = MemoryStore::default();
    let journal = RecordingJournal::default();
    let health = NoopHealth;
    let providers: Vec<Box<dyn NotificationProvider>> = Vec::new();
    let retry = RetryConfig::default();

    run_cycle(&fetcher, &store, &providers, &journal, &health, &retry, &|_| {});
    let outcome = run_cycle(&fetcher, &store, &providers, &journal, &health, &retry, &|_| {});

    assert_eq!(outcome.result, CycleResult::OkNoChanges);
    assert!(journal.entries.borrow().is_empty());
}
