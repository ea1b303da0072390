// crates/gradewatch-core/src/runtime/differ.rs
// ============================================================================
// Module: Differ
// Description: Computes a ChangeReport from (previous state in store, new snapshot).
// Purpose: ID-based change detection that avoids false positives from formatting drift.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The differ never inspects the store's internal structure directly; it
//! only ever calls [`SnapshotStore::latest_timestamp`] and
//! [`SnapshotStore::get_assignment`]. Any error encountered while diffing is
//! caught and degrades to an empty, `is_initial = true` report — a
//! deliberate fail-safe: when in doubt, do not notify.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::Change;
use crate::core::ChangeCounts;
use crate::core::ChangeReport;
use crate::core::ChangeType;
use crate::core::assignments_comment_equivalent;
use crate::core::assignments_grade_equal;
use crate::core::is_substantive_comment_change;
use crate::core::model::Assignment;
use crate::core::model::Snapshot;
use crate::interfaces::SnapshotStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Differ
// ============================================================================

/// Computes a [`ChangeReport`] for `snapshot` against `store`'s current
/// state, per §4.C.
pub fn diff(snapshot: &Snapshot, store: &dyn SnapshotStore) -> ChangeReport {
    match try_diff(snapshot, store) {
        Ok(report) => report,
        Err(_) => ChangeReport::initial(snapshot.timestamp),
    }
}

fn try_diff(snapshot: &Snapshot, store: &dyn SnapshotStore) -> Result<ChangeReport, StoreError> {
    if store.latest_timestamp()?.is_none() {
        return Ok(ChangeReport::initial(snapshot.timestamp));
    }

    let mut changes = Vec::new();
    let mut counts = ChangeCounts::default();

    for (section, period, category, new) in snapshot.iter_assignments_sorted() {
        if !new.is_graded() {
            continue;
        }

        let old_ctx = store.get_assignment(&new.assignment_id)?.filter(|ctx| ctx.assignment.is_graded());

        let Some(old_ctx) = old_ctx else {
            changes.push(Change {
                change_type: ChangeType::NewAssignment,
                section_title: section.section_title.clone(),
                period_name: period.name.clone(),
                category_name: category.name.clone(),
                assignment_title: new.title.clone(),
                assignment_id: new.assignment_id.clone(),
                old: "—".to_owned(),
                new: new.format_grade(),
            });
            counts.new_assignments += 1;
            continue;
        };

        if let Some(change) = classify_update(section, period, category, &old_ctx.assignment, new) {
            match change.change_type {
                ChangeType::ExceptionUpdated | ChangeType::GradeUpdated => counts.grade_updates += 1,
                ChangeType::CommentUpdated => counts.comment_updates += 1,
                ChangeType::NewAssignment => unreachable!("handled above"),
            }
            changes.push(change);
        }
    }

    Ok(ChangeReport {
        timestamp: snapshot.timestamp,
        changes,
        counts,
        is_initial: false,
    })
}

/// Classifies the update between a previously graded observation and the
/// current one, honoring the precedence order from §4.C step 2: exception
/// changes take priority over grade changes, which take priority over
/// comment changes.
fn classify_update(
    section: &crate::core::model::Section,
    period: &crate::core::model::Period,
    category: &crate::core::model::Category,
    old: &Assignment,
    new: &Assignment,
) -> Option<Change> {
    if old.exception != new.exception {
        return Some(Change {
            change_type: ChangeType::ExceptionUpdated,
            section_title: section.section_title.clone(),
            period_name: period.name.clone(),
            category_name: category.name.clone(),
            assignment_title: new.title.clone(),
            assignment_id: new.assignment_id.clone(),
            old: old.exception.format().to_owned(),
            new: new.exception.format().to_owned(),
        });
    }

    if !assignments_grade_equal(old, new) {
        return Some(Change {
            change_type: ChangeType::GradeUpdated,
            section_title: section.section_title.clone(),
            period_name: period.name.clone(),
            category_name: category.name.clone(),
            assignment_title: new.title.clone(),
            assignment_id: new.assignment_id.clone(),
            old: old.format_grade(),
            new: new.format_grade(),
        });
    }

    if !assignments_comment_equivalent(old, new) && is_substantive_comment_change(old, new) {
        return Some(Change {
            change_type: ChangeType::CommentUpdated,
            section_title: section.section_title.clone(),
            period_name: period.name.clone(),
            category_name: category.name.clone(),
            assignment_title: new.title.clone(),
            assignment_id: new.assignment_id.clone(),
            old: old.comment.clone().unwrap_or_default(),
            new: new.comment.clone().unwrap_or_default(),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use time::OffsetDateTime;
    use time::macros::datetime;

    use super::*;
    use crate::core::identifiers::AssignmentId;
    use crate::core::identifiers::CategoryId;
    use crate::core::identifiers::PeriodId;
    use crate::core::identifiers::SectionId;
    use crate::core::model::Category;
    use crate::core::model::Exception;
    use crate::core::model::Period;
    use crate::core::model::Section;
    use crate::interfaces::AssignmentContext;

    /// An in-memory [`SnapshotStore`] fake, keyed by `assignment_id`, for
    /// differ-level unit tests (the real backend lives in
    /// `gradewatch-store-sqlite`).
    #[derive(Default)]
    struct FakeStore {
        timestamp: RefCell<Option<OffsetDateTime>>,
        assignments: RefCell<BTreeMap<String, AssignmentContext>>,
    }

    impl SnapshotStore for FakeStore {
        fn latest_timestamp(&self) -> Result<Option<OffsetDateTime>, StoreError> {
            Ok(*self.timestamp.borrow())
        }

        fn get_assignment(
            &self,
            id: &AssignmentId,
        ) -> Result<Option<AssignmentContext>, StoreError> {
            Ok(self.assignments.borrow().get(id.as_str()).cloned())
        }

        fn get_category(
            &self,
            _category_id: &CategoryId,
            _period_id: &PeriodId,
        ) -> Result<Option<Category>, StoreError> {
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

    fn assignment(id: &str, earned: &str, max: &str, exception: Exception, comment: Option<&str>) -> Assignment {
        Assignment {
            assignment_id: AssignmentId::new(id),
            title: "A1".to_owned(),
            earned_points: Some(BigDecimal::from_str(earned).unwrap()),
            max_points: Some(BigDecimal::from_str(max).unwrap()),
            exception,
            comment: comment.map(str::to_owned),
            due_date: None,
        }
    }

    fn snapshot_with(timestamp: OffsetDateTime, assignment: Assignment) -> Snapshot {
        Snapshot {
            timestamp,
            sections: vec![Section {
                section_id: SectionId::new("s1"),
                course_title: "Course".to_owned(),
                section_title: "Section 1".to_owned(),
                periods: vec![Period {
                    period_id: PeriodId::new("p1"),
                    name: "Period 1".to_owned(),
                    categories: vec![Category {
                        category_id: CategoryId::new("c1"),
                        name: "Category 1".to_owned(),
                        weight: None,
                        assignments: vec![assignment],
                    }],
                }],
            }],
        }
    }

    #[test]
    fn seed_1_initial_run_on_empty_store() {
        let store = FakeStore::default();
        let a1 = assignment("100", "5", "5", Exception::None, Some(""));
        let snapshot = snapshot_with(datetime!(2026-01-01 00:00 UTC), a1);

        let report = diff(&snapshot, &store);
        assert!(report.is_initial);
        assert!(report.changes.is_empty());

        store.replace_all(&snapshot).unwrap();
        let ctx = store.get_assignment(&AssignmentId::new("100")).unwrap().unwrap();
        assert_eq!(ctx.assignment.earned_points, snapshot.sections[0].periods[0].categories[0].assignments[0].earned_points);
    }

    #[test]
    fn seed_2_no_op_resubmit_yields_no_changes() {
        let store = FakeStore::default();
        let a1 = assignment("100", "5", "5", Exception::None, Some(""));
        let first = snapshot_with(datetime!(2026-01-01 00:00 UTC), a1.clone());
        store.replace_all(&first).unwrap();

        let second = snapshot_with(datetime!(2026-01-02 00:00 UTC), a1);
        let report = diff(&second, &store);
        assert!(!report.is_initial);
        assert!(report.changes.is_empty());
    }

    #[test]
    fn seed_3_grade_change_is_reported() {
        let store = FakeStore::default();
        let a1 = assignment("100", "5", "5", Exception::None, None);
        let first = snapshot_with(datetime!(2026-01-01 00:00 UTC), a1);
        store.replace_all(&first).unwrap();

        let a1_changed = assignment("100", "4", "5", Exception::None, None);
        let second = snapshot_with(datetime!(2026-01-02 00:00 UTC), a1_changed);
        let report = diff(&second, &store);

        assert_eq!(report.counts.grade_updates, 1);
        assert_eq!(report.changes.len(), 1);
        let change = &report.changes[0];
        assert_eq!(change.change_type, ChangeType::GradeUpdated);
        assert_eq!(change.old, "5 / 5");
        assert_eq!(change.new, "4 / 5");
    }

    #[test]
    fn seed_4_new_graded_assignment_is_reported() {
        let store = FakeStore::default();
        let a1 = assignment("100", "5", "5", Exception::None, None);
        let first = snapshot_with(datetime!(2026-01-01 00:00 UTC), a1.clone());
        store.replace_all(&first).unwrap();

        let a2 = assignment("200", "10", "10", Exception::None, None);
        let mut second = snapshot_with(datetime!(2026-01-02 00:00 UTC), a1);
        second.sections[0].periods[0].categories[0].assignments.push(a2);

        let report = diff(&second, &store);
        assert_eq!(report.counts.new_assignments, 1);
        let change = report
            .changes
            .iter()
            .find(|c| c.assignment_id.as_str() == "200")
            .unwrap();
        assert_eq!(change.change_type, ChangeType::NewAssignment);
        assert_eq!(change.old, "—");
    }

    #[test]
    fn seed_5_formatting_only_drift_yields_no_changes() {
        let store = FakeStore::default();
        let a1 = assignment("100", "5", "5", Exception::None, Some(""));
        let first = snapshot_with(datetime!(2026-01-01 00:00 UTC), a1);
        store.replace_all(&first).unwrap();

        let a1_reformatted = assignment("100", "5.00", "5.0", Exception::None, Some("No Comment"));
        let second = snapshot_with(datetime!(2026-01-02 00:00 UTC), a1_reformatted);
        let report = diff(&second, &store);
        assert!(report.changes.is_empty());
    }

    #[test]
    fn seed_6_exception_transition_from_ungraded_is_new_assignment() {
        let store = FakeStore::default();
        let a1 = Assignment {
            assignment_id: AssignmentId::new("100"),
            title: "A1".to_owned(),
            earned_points: None,
            max_points: Some(BigDecimal::from_str("10").unwrap()),
            exception: Exception::None,
            comment: None,
            due_date: None,
        };
        let first = snapshot_with(datetime!(2026-01-01 00:00 UTC), a1.clone());
        store.replace_all(&first).unwrap();

        let mut a1_missing = a1;
        a1_missing.exception = Exception::Missing;
        let second = snapshot_with(datetime!(2026-01-02 00:00 UTC), a1_missing);

        let report = diff(&second, &store);
        assert_eq!(report.counts.new_assignments, 1);
        assert_eq!(report.changes[0].change_type, ChangeType::NewAssignment);
    }

    #[test]
    fn ungraded_assignments_never_produce_changes() {
        let store = FakeStore::default();
        let graded_seed = assignment("999", "1", "1", Exception::None, None);
        let first = snapshot_with(datetime!(2026-01-01 00:00 UTC), graded_seed);
        store.replace_all(&first).unwrap();

        let ungraded = Assignment {
            assignment_id: AssignmentId::new("100"),
            title: "Ungraded".to_owned(),
            earned_points: None,
            max_points: None,
            exception: Exception::None,
            comment: None,
            due_date: None,
        };
        let mut second = first.clone();
        second.timestamp = datetime!(2026-01-02 00:00 UTC);
        second.sections[0].periods[0].categories[0].assignments.push(ungraded);

        let report = diff(&second, &store);
        assert!(report.changes.iter().all(|c| c.assignment_id.as_str() != "100"));
    }

    #[test]
    fn max_points_zero_is_ungraded_boundary() {
        let store = FakeStore::default();
        let seed = assignment("1", "1", "1", Exception::None, None);
        let first = snapshot_with(datetime!(2026-01-01 00:00 UTC), seed);
        store.replace_all(&first).unwrap();

        let zero_max = assignment("2", "5", "0", Exception::None, None);
        let mut second = first.clone();
        second.timestamp = datetime!(2026-01-02 00:00 UTC);
        second.sections[0].periods[0].categories[0].assignments.push(zero_max);

        let report = diff(&second, &store);
        assert!(report.changes.iter().all(|c| c.assignment_id.as_str() != "2"));
    }

    #[test]
    fn deletions_are_never_reported() {
        let store = FakeStore::default();
        let a1 = assignment("100", "5", "5", Exception::None, None);
        let a2 = assignment("200", "5", "5", Exception::None, None);
        let mut first = snapshot_with(datetime!(2026-01-01 00:00 UTC), a1.clone());
        first.sections[0].periods[0].categories[0].assignments.push(a2);
        store.replace_all(&first).unwrap();

        let second = snapshot_with(datetime!(2026-01-02 00:00 UTC), a1);
        let report = diff(&second, &store);
        assert!(report.changes.is_empty(), "deletion of id 200 must not be reported");
    }

    #[test]
    fn change_ordering_is_deterministic_across_runs() {
        let store = FakeStore::default();
        let seed = assignment("1", "1", "1", Exception::None, None);
        let first = snapshot_with(datetime!(2026-01-01 00:00 UTC), seed);
        store.replace_all(&first).unwrap();

        let b = assignment("b", "2", "2", Exception::None, None);
        let a = assignment("a", "2", "2", Exception::None, None);
        let mut second = first.clone();
        second.timestamp = datetime!(2026-01-02 00:00 UTC);
        second.sections[0].periods[0].categories[0].assignments.push(b);
        second.sections[0].periods[0].categories[0].assignments.push(a);

        let first_run = diff(&second, &store);
        let second_run = diff(&second, &store);
        assert_eq!(first_run.changes, second_run.changes);
        let ids: Vec<&str> = first_run.changes.iter().map(|c| c.assignment_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"], "unchanged id \"1\" must not appear, and new ids sort lexically");
    }
}
