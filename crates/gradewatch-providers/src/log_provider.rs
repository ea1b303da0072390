// crates/gradewatch-providers/src/log_provider.rs
// ============================================================================
// Module: Log Provider
// Description: Notification provider that emits a tracing event.
// Purpose: The ambient-logging analogue of a delivery transport; always available.
// Dependencies: gradewatch-core, tracing
// ============================================================================

use gradewatch_core::core::NotificationMessage;
use gradewatch_core::interfaces::NotificationProvider;

/// Emits every notification as a `tracing` event at `info` level. Always
/// available; useful standalone (air-gapped setups) or alongside other
/// providers for an operator-visible audit trail.
pub struct LogProvider;

impl NotificationProvider for LogProvider {
    fn name(&self) -> &str {
        "log"
    }

    fn available(&self) -> bool {
        true
    }

    fn send(&self, message: &NotificationMessage) -> bool {
        tracing::info!(title = %message.title, content = %message.content, "notification");
        true
    }
}

#[cfg(test)]
mod tests {
    use gradewatch_core::core::Priority;

    use super::*;

    #[test]
    fn log_provider_is_always_available_and_always_succeeds() {
        let provider = LogProvider;
        assert!(provider.available());
        let message = NotificationMessage {
            title: "Changes detected".to_owned(),
            content: "1 new".to_owned(),
            priority: Priority::Normal,
            url: None,
            metadata: std::collections::BTreeMap::new(),
        };
        assert!(provider.send(&message));
    }
}
