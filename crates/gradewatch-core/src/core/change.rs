// crates/gradewatch-core/src/core/change.rs
// ============================================================================
// Module: Change Report
// Description: The structured diff output of one cycle.
// Purpose: Give the journal and notification manager a single shared shape.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! `ChangeReport` is produced by the differ and consumed by the journal and
//! the notification manager. It never contains deletions: per §4.C,
//! deletions are silently dropped at `replace_all`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

use crate::core::identifiers::AssignmentId;

// ============================================================================
// SECTION: Change
// ============================================================================

/// The kind of semantic delta a [`Change`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// A previously unseen graded assignment appeared.
    NewAssignment,
    /// Points changed on an assignment that was already graded.
    GradeUpdated,
    /// The exception value changed.
    ExceptionUpdated,
    /// The comment changed substantively.
    CommentUpdated,
}

/// A single semantic delta between two observations of the same assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// The kind of delta this record describes.
    pub change_type: ChangeType,
    /// Section title at observation time (informational, for display).
    pub section_title: String,
    /// Period name at observation time.
    pub period_name: String,
    /// Category name at observation time.
    pub category_name: String,
    /// Assignment title at observation time.
    pub assignment_title: String,
    /// The assignment this change refers to.
    pub assignment_id: AssignmentId,
    /// Formatted prior value; `"—"` when there was none.
    pub old: String,
    /// Formatted new value.
    pub new: String,
}

// ============================================================================
// SECTION: Counts / Report
// ============================================================================

/// Per-category tallies of a [`ChangeReport`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeCounts {
    /// Count of `new_assignment` changes.
    pub new_assignments: u64,
    /// Count of `grade_updated` and `exception_updated` changes.
    pub grade_updates: u64,
    /// Count of `comment_updated` changes.
    pub comment_updates: u64,
}

impl ChangeCounts {
    /// Total number of changes across every category.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.new_assignments + self.grade_updates + self.comment_updates
    }

    /// Renders the summary sentence: `"{n} new, {m} grade update(s), {k}
    /// comment update(s)"`, suppressing any zero-count term. Empty when every
    /// count is zero.
    #[must_use]
    pub fn summary_sentence(&self) -> String {
        let mut parts = Vec::with_capacity(3);
        if self.new_assignments > 0 {
            parts.push(format!("{} new", self.new_assignments));
        }
        if self.grade_updates > 0 {
            parts.push(format!("{} grade update(s)", self.grade_updates));
        }
        if self.comment_updates > 0 {
            parts.push(format!("{} comment update(s)", self.comment_updates));
        }
        parts.join(", ")
    }
}

/// The structured diff output of one cycle.
///
/// # Invariants
/// - `is_initial = true` iff the store had no prior snapshot when the differ ran.
/// - `changes` never records a deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeReport {
    /// Observation timestamp of the new snapshot this report describes.
    pub timestamp: OffsetDateTime,
    /// Ordered changes, tie-broken by section/period/category/assignment id.
    pub changes: Vec<Change>,
    /// Tallies by category.
    pub counts: ChangeCounts,
    /// True iff the differ declined to compute changes (no prior state, or
    /// an internal error forced the fail-safe).
    pub is_initial: bool,
}

impl ChangeReport {
    /// Builds the degraded fail-safe report used when the store is empty or
    /// an internal error occurs during diffing.
    #[must_use]
    pub fn initial(timestamp: OffsetDateTime) -> Self {
        Self {
            timestamp,
            changes: Vec::new(),
            counts: ChangeCounts::default(),
            is_initial: true,
        }
    }

    /// True iff this report carries no changes (and is therefore skipped by
    /// both notification and the journal, per §4.G/§4.D).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_sentence_suppresses_zero_terms() {
        let counts = ChangeCounts {
            new_assignments: 0,
            grade_updates: 1,
            comment_updates: 0,
        };
        assert_eq!(counts.summary_sentence(), "1 grade update(s)");
    }

    #[test]
    fn summary_sentence_empty_when_all_zero() {
        assert_eq!(ChangeCounts::default().summary_sentence(), "");
    }
}
