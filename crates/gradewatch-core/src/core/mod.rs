// crates/gradewatch-core/src/core/mod.rs
// ============================================================================
// Module: Core Data Model
// Description: Re-exports the snapshot tree, change report, and notification types.
// Purpose: Single import surface for the normalized data model.
// Dependencies: (submodules)
// ============================================================================

pub mod change;
pub mod equality;
pub mod identifiers;
pub mod model;
pub mod notification;
pub mod time;

pub use change::Change;
pub use change::ChangeCounts;
pub use change::ChangeReport;
pub use change::ChangeType;
pub use equality::assignments_comment_equivalent;
pub use equality::assignments_grade_equal;
pub use equality::is_substantive_comment_change;
pub use equality::normalize_comment;
pub use identifiers::AssignmentId;
pub use identifiers::CategoryId;
pub use identifiers::PeriodId;
pub use identifiers::SectionId;
pub use model::Assignment;
pub use model::Category;
pub use model::Exception;
pub use model::Period;
pub use model::Section;
pub use model::Snapshot;
pub use model::format_decimal;
pub use notification::NotificationMessage;
pub use notification::Priority;
pub use time::format_due_date;
pub use time::format_rfc3339;
pub use time::parse_rfc3339;
