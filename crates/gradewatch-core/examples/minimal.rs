// crates/gradewatch-core/examples/minimal.rs
// ============================================================================
// Module: Gradewatch Minimal Example
// Description: Minimal end-to-end pipeline cycle using in-memory adapters.
// Purpose: Demonstrate run_cycle without a real HTTP fetcher or SQLite store.
// Dependencies: gradewatch-core
// ============================================================================

//! ## Overview
//! Runs two pipeline cycles against in-memory fakes: the first observes an
//! empty store and is silent (`is_initial`); the second reports a grade
//! change and dispatches it to a logging provider.

#![allow(clippy::print_stdout)]

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
use gradewatch_core::runtime::RetryConfig;
use gradewatch_core::runtime::run_cycle;
use time::macros::datetime;

/// Fetcher that always returns a pre-built snapshot.
struct FixedFetcher(RefCell<Vec<Snapshot>>);

impl SnapshotFetcher for FixedFetcher {
    fn fetch(&self) -> Result<Snapshot, FetchError> {
        self.0
            .borrow_mut()
            .pop()
            .ok_or_else(|| FetchError::Transport("no more fixtures".to_owned()))
    }
}

/// In-memory store keyed by assignment id.
#[derive(Default)]
struct MemoryStore {
    timestamp: RefCell<Option<time::OffsetDateTime>>,
    assignments: RefCell<BTreeMap<String, AssignmentContext>>,
}

impl SnapshotStore for MemoryStore {
    fn latest_timestamp(&self) -> Result<Option<time::OffsetDateTime>, StoreError> {
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

struct StdoutJournal;

impl ChangeJournal for StdoutJournal {
    fn append(&self, record: &JournalRecord<'_>) -> Result<(), JournalError> {
        println!("journal: {} change(s)", record.report.changes.len());
        Ok(())
    }

    fn prune(&self, _now: time::OffsetDateTime) -> Result<(), JournalError> {
        Ok(())
    }
}

struct StdoutProvider;

impl NotificationProvider for StdoutProvider {
    fn name(&self) -> &str {
        "stdout"
    }

    fn available(&self) -> bool {
        true
    }

    fn send(&self, message: &NotificationMessage) -> bool {
        println!("notify[{}]: {}", message.title, message.content);
        true
    }
}

struct NoopHealth;

impl HealthPing for NoopHealth {
    fn ping(&self, _success: bool) -> Result<(), HealthPingError> {
        Ok(())
    }
}

fn assignment(id: &str, earned: &str, max: &str) -> Assignment {
    Assignment {
        assignment_id: AssignmentId::new(id),
        title: "Homework 1".to_owned(),
        earned_points: Some(BigDecimal::from_str(earned).unwrap()),
        max_points: Some(BigDecimal::from_str(max).unwrap()),
        exception: Exception::None,
        comment: None,
        due_date: None,
    }
}

fn snapshot(timestamp: time::OffsetDateTime, earned: &str) -> Snapshot {
    Snapshot {
        timestamp,
        sections: vec![Section {
            section_id: SectionId::new("s1"),
            course_title: "Algebra I".to_owned(),
            section_title: "Period 3".to_owned(),
            periods: vec![Period {
                period_id: PeriodId::new("p1"),
                name: "Q1".to_owned(),
                categories: vec![Category {
                    category_id: CategoryId::new("c1"),
                    name: "Homework".to_owned(),
                    weight: None,
                    assignments: vec![assignment("a1", earned, "10")],
                }],
            }],
        }],
    }
}

fn main() {
    let fetcher = FixedFetcher(RefCell::new(vec![
        snapshot(datetime!(2026-01-02 09:00 UTC), "8"),
        snapshot(datetime!(2026-01-01 09:00 UTC), "10"),
    ]));
    let store = MemoryStore::default();
    let journal = StdoutJournal;
    let health = NoopHealth;
    let providers: Vec<Box<dyn NotificationProvider>> = vec![Box::new(StdoutProvider)];
    let retry = RetryConfig::default();

    let first = run_cycle(&fetcher, &store, &providers, &journal, &health, &retry, &std::thread::sleep);
    println!("cycle 1: {}", first.result);

    let second = run_cycle(&fetcher, &store, &providers, &journal, &health, &retry, &std::thread::sleep);
    println!("cycle 2: {}", second.result);
}
