// crates/gradewatch-core/src/core/model.rs
// ============================================================================
// Module: Snapshot Data Model
// Description: The normalized 4-level grade tree: Snapshot/Section/Period/Category/Assignment.
// Purpose: Give the differ and store a single, stable in-memory representation.
// Dependencies: serde, bigdecimal, time
// ============================================================================

//! ## Overview
//! A snapshot is a read-only observation of the full grade tree at an
//! instant. Every level carries an opaque upstream identifier; nothing in
//! this module assigns or normalizes identifiers. Numeric fields use
//! [`BigDecimal`] throughout so that `"5"` and `"5.00"` compare equal and
//! formatting never loses precision upstream produced.

// ============================================================================
// SECTION: Imports
// ============================================================================

use bigdecimal::BigDecimal;
use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

use crate::core::identifiers::AssignmentId;
use crate::core::identifiers::CategoryId;
use crate::core::identifiers::PeriodId;
use crate::core::identifiers::SectionId;

// ============================================================================
// SECTION: Exception
// ============================================================================

/// Grading exception applied to an assignment by the upstream source.
///
/// # Invariants
/// - Upstream integer codes `{0,1,2,3}` map to these variants in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exception {
    /// No exception; the assignment is graded normally.
    None,
    /// The student is excused from the assignment.
    Excused,
    /// The assignment is marked incomplete.
    Incomplete,
    /// The assignment is marked missing.
    Missing,
}

impl Exception {
    /// Converts an upstream integer code into an [`Exception`].
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::Excused),
            2 => Some(Self::Incomplete),
            3 => Some(Self::Missing),
            _ => None,
        }
    }

    /// Renders the exception using the formatting convention of notification
    /// content and change `old`/`new` values: `none` renders as `"—"`.
    #[must_use]
    pub fn format(self) -> &'static str {
        match self {
            Self::None => "—",
            Self::Excused => "excused",
            Self::Incomplete => "incomplete",
            Self::Missing => "missing",
        }
    }
}

impl Default for Exception {
    fn default() -> Self {
        Self::None
    }
}

// ============================================================================
// SECTION: Assignment
// ============================================================================

/// A single assignment, the only level matched by `assignment_id` across cycles.
///
/// # Invariants
/// - `assignment_id` is globally unique within a snapshot.
/// - `earned_points`/`max_points` are exact decimals; equality is numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Globally unique identifier; the sole match key across cycles.
    pub assignment_id: AssignmentId,
    /// Assignment title. Informational; empty strings are legal and not compared.
    pub title: String,
    /// Points earned, if graded.
    pub earned_points: Option<BigDecimal>,
    /// Maximum points available.
    pub max_points: Option<BigDecimal>,
    /// Grading exception, if any.
    pub exception: Exception,
    /// Free-text comment, if any.
    pub comment: Option<String>,
    /// Due date, if any.
    pub due_date: Option<OffsetDateTime>,
}

impl Assignment {
    /// Returns true iff this assignment is "graded" per invariant 3: either
    /// both points are present with `max_points > 0`, or an exception is set.
    #[must_use]
    pub fn is_graded(&self) -> bool {
        let points_graded = match (&self.earned_points, &self.max_points) {
            (Some(_), Some(max)) => *max > BigDecimal::from(0),
            _ => false,
        };
        points_graded || self.exception != Exception::None
    }

    /// Formats the grade as `"earned / max"`, with an absent side rendered
    /// as `"—"` and decimals stripped of trailing zeros.
    #[must_use]
    pub fn format_grade(&self) -> String {
        let earned = self
            .earned_points
            .as_ref()
            .map_or_else(|| "—".to_owned(), format_decimal);
        let max = self
            .max_points
            .as_ref()
            .map_or_else(|| "—".to_owned(), format_decimal);
        format!("{earned} / {max}")
    }
}

/// Strips trailing fractional zeros (and a trailing decimal point) from a
/// decimal's canonical string form.
#[must_use]
pub fn format_decimal(value: &BigDecimal) -> String {
    let rendered = value.normalized().to_string();
    if let Some((int_part, frac_part)) = rendered.split_once('.') {
        let trimmed = frac_part.trim_end_matches('0');
        if trimmed.is_empty() {
            int_part.to_owned()
        } else {
            format!("{int_part}.{trimmed}")
        }
    } else {
        rendered
    }
}

// ============================================================================
// SECTION: Category / Period / Section / Snapshot
// ============================================================================

/// An assignment category, unique within its period via `(category_id, period_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Identifier unique within `period_id`.
    pub category_id: CategoryId,
    /// Category name. Informational.
    pub name: String,
    /// Optional weight in `[0, 100]`.
    pub weight: Option<BigDecimal>,
    /// Assignments belonging to this category.
    pub assignments: Vec<Assignment>,
}

/// A grading period, unique within a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    /// Identifier unique within a snapshot.
    pub period_id: PeriodId,
    /// Period name. Informational.
    pub name: String,
    /// Categories belonging to this period.
    pub categories: Vec<Category>,
}

/// A course section, unique within a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Identifier unique within a snapshot.
    pub section_id: SectionId,
    /// Course title. Informational; carries no diff signal.
    pub course_title: String,
    /// Section title. Informational; carries no diff signal.
    pub section_title: String,
    /// Periods belonging to this section.
    pub periods: Vec<Period>,
}

/// An immutable observation of the full grade tree at an instant.
///
/// # Invariants
/// - `assignment_id` is unique across every assignment in the tree.
/// - `(category_id, period_id)`, `period_id`, and `section_id` are each unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The instant this snapshot was observed.
    pub timestamp: OffsetDateTime,
    /// Top-level sections.
    pub sections: Vec<Section>,
}

impl Snapshot {
    /// Iterates every assignment in the tree, alongside the section, period,
    /// and category it belongs to, in stable traversal order (each level
    /// sorted by identifier).
    pub fn iter_assignments_sorted(
        &self,
    ) -> impl Iterator<Item = (&Section, &Period, &Category, &Assignment)> {
        let mut sections: Vec<&Section> = self.sections.iter().collect();
        sections.sort_by(|a, b| a.section_id.cmp(&b.section_id));
        sections.into_iter().flat_map(|section| {
            let mut periods: Vec<&Period> = section.periods.iter().collect();
            periods.sort_by(|a, b| a.period_id.cmp(&b.period_id));
            periods.into_iter().flat_map(move |period| {
                let mut categories: Vec<&Category> = period.categories.iter().collect();
                categories.sort_by(|a, b| a.category_id.cmp(&b.category_id));
                categories.into_iter().flat_map(move |category| {
                    let mut assignments: Vec<&Assignment> = category.assignments.iter().collect();
                    assignments.sort_by(|a, b| a.assignment_id.cmp(&b.assignment_id));
                    assignments
                        .into_iter()
                        .map(move |assignment| (section, period, category, assignment))
                })
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn assignment(id: &str, earned: Option<&str>, max: Option<&str>, exception: Exception) -> Assignment {
        Assignment {
            assignment_id: AssignmentId::new(id),
            title: String::new(),
            earned_points: earned.map(|v| BigDecimal::from_str(v).unwrap()),
            max_points: max.map(|v| BigDecimal::from_str(v).unwrap()),
            exception,
            comment: None,
            due_date: None,
        }
    }

    #[test]
    fn graded_requires_positive_max_points() {
        let a = assignment("1", Some("5"), Some("5"), Exception::None);
        assert!(a.is_graded());

        let b = assignment("2", Some("5"), Some("0"), Exception::None);
        assert!(!b.is_graded(), "max_points = 0 must be ungraded");
    }

    #[test]
    fn exception_alone_makes_an_assignment_graded() {
        let a = assignment("1", None, None, Exception::Missing);
        assert!(a.is_graded());
    }

    #[test]
    fn ungraded_without_points_or_exception() {
        let a = assignment("1", None, None, Exception::None);
        assert!(!a.is_graded());
    }

    #[test]
    fn format_grade_strips_trailing_zeros_and_marks_absence() {
        let a = assignment("1", Some("5.00"), Some("5.0"), Exception::None);
        assert_eq!(a.format_grade(), "5 / 5");

        let b = assignment("2", None, Some("10"), Exception::None);
        assert_eq!(b.format_grade(), "— / 10");
    }

    #[test]
    fn exception_code_mapping_matches_declared_order() {
        assert_eq!(Exception::from_code(0), Some(Exception::None));
        assert_eq!(Exception::from_code(3), Some(Exception::Missing));
        assert_eq!(Exception::from_code(4), None);
    }
}
