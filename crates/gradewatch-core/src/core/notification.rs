// crates/gradewatch-core/src/core/notification.rs
// ============================================================================
// Module: Notification Message
// Description: The message shape fanned out to providers by §4.E.
// Purpose: Give every provider a uniform, serializable payload.
// Dependencies: serde
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Priority
// ============================================================================

/// Delivery priority hint carried on a [`NotificationMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Background-worthy; providers may batch or defer.
    Low,
    /// The default priority for change notifications.
    Normal,
    /// Used for pipeline errors; providers should surface this promptly.
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        };
        f.write_str(label)
    }
}

// ============================================================================
// SECTION: Notification Message
// ============================================================================

/// `(title, content, priority, url?, metadata)` — the message fanned out to
/// every active provider in one cycle.
///
/// # Invariants
/// - `metadata` keys are provider- and orchestrator-contributed; no key is reserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    /// Short human-readable title.
    pub title: String,
    /// Full message body.
    pub content: String,
    /// Delivery priority hint.
    pub priority: Priority,
    /// Optional deep link associated with the message.
    pub url: Option<String>,
    /// String-keyed metadata, augmented by at most one enricher per cycle.
    pub metadata: BTreeMap<String, String>,
}

impl NotificationMessage {
    /// Builds the standard "changes detected" message for a non-empty,
    /// non-initial [`crate::core::change::ChangeReport`].
    #[must_use]
    pub fn changes_detected(content: String, metadata: BTreeMap<String, String>) -> Self {
        Self {
            title: "Changes detected".to_owned(),
            content,
            priority: Priority::Normal,
            url: None,
            metadata,
        }
    }

    /// Builds the distinguished pipeline-error message emitted on a final
    /// fetch failure, per §7.
    #[must_use]
    pub fn pipeline_error(content: String) -> Self {
        Self {
            title: "Pipeline error".to_owned(),
            content,
            priority: Priority::High,
            url: None,
            metadata: BTreeMap::new(),
        }
    }
}
