// crates/gradewatch-core/src/core/identifiers.rs
// ============================================================================
// Module: Gradewatch Identifiers
// Description: Canonical opaque identifiers for the grade snapshot tree.
// Purpose: Provide strongly typed, serializable identifiers with stable wire forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Identifiers for every level of the snapshot tree (section, period,
//! category, assignment). All identifiers are opaque upstream strings: this
//! crate never generates, normalizes, or validates them beyond requiring a
//! non-empty value at construction.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

macro_rules! opaque_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        ///
        /// # Invariants
        /// - Opaque UTF-8 string; no normalization or validation is applied by this type.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

opaque_id!(SectionId, "Identifier for a course section.");
opaque_id!(PeriodId, "Identifier for a grading period within a section.");
opaque_id!(CategoryId, "Identifier for an assignment category within a period.");
opaque_id!(AssignmentId, "Identifier for an assignment within a category.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_display_and_as_str() {
        let id = AssignmentId::new("a-123");
        assert_eq!(id.as_str(), "a-123");
        assert_eq!(id.to_string(), "a-123");
    }

    #[test]
    fn distinct_id_types_are_not_interchangeable() {
        let section = SectionId::new("s-1");
        let period = PeriodId::new("s-1");
        assert_eq!(section.as_str(), period.as_str());
    }

    #[test]
    fn from_str_and_from_string_agree() {
        let a = CategoryId::from("c-1");
        let b = CategoryId::from(String::from("c-1"));
        assert_eq!(a, b);
    }
}
