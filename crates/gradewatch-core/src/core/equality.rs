// crates/gradewatch-core/src/core/equality.rs
// ============================================================================
// Module: Assignment Equality Predicates
// Description: Value-equality predicates used by the differ.
// Purpose: Decide, per §4.A, whether two assignment observations are the same.
// Dependencies: crate::core::model
// ============================================================================

//! ## Overview
//! These predicates are the only place formatting drift is absorbed: numeric
//! equality ignores textual representation, and comment equivalence ignores
//! case, surrounding whitespace, and the "no comment" sentinel family.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::model::Assignment;

// ============================================================================
// SECTION: Grade Equality
// ============================================================================

/// Numeric equality on `earned_points`/`max_points`, exact equality on
/// `exception`. Titles are not compared.
#[must_use]
pub fn assignments_grade_equal(a: &Assignment, b: &Assignment) -> bool {
    a.earned_points == b.earned_points && a.max_points == b.max_points && a.exception == b.exception
}

// ============================================================================
// SECTION: Comment Equivalence
// ============================================================================

/// Normalizes a comment: lowercases, trims, and maps the empty string and
/// case-insensitive `"no comment"` to the empty sentinel.
///
/// Preserves the minimal sentinel set named in the source spec; other
/// plausible sentinels (`"—"`, `"n/a"`) are deliberately not recognized.
#[must_use]
pub fn normalize_comment(comment: Option<&str>) -> String {
    let trimmed = comment.unwrap_or_default().trim().to_lowercase();
    if trimmed == "no comment" {
        String::new()
    } else {
        trimmed
    }
}

/// True iff the normalized comments are equal.
#[must_use]
pub fn assignments_comment_equivalent(a: &Assignment, b: &Assignment) -> bool {
    normalize_comment(a.comment.as_deref()) == normalize_comment(b.comment.as_deref())
}

/// True iff a comment difference between `a` and `b` is *substantive*: both
/// sides normalize to non-empty text, and they differ.
#[must_use]
pub fn is_substantive_comment_change(a: &Assignment, b: &Assignment) -> bool {
    let left = normalize_comment(a.comment.as_deref());
    let right = normalize_comment(b.comment.as_deref());
    !left.is_empty() && !right.is_empty() && left != right
}
