// crates/gradewatch-core/src/runtime/notify_manager.rs
// ============================================================================
// Module: Notification Manager
// Description: Ordered fan-out of a NotificationMessage across active providers.
// Purpose: Implement the §4.E fan-out algorithm, independent of any concrete transport.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The manager never raises: every provider's `send` (and, for the chosen
//! enricher, `enrich`) is called behind a boundary that cannot propagate a
//! panic-worthy failure into the orchestrator. Concrete providers (webhook,
//! log, file) live outside this crate.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::NotificationMessage;
use crate::interfaces::NotificationProvider;
use crate::interfaces::NotifyResults;

// ============================================================================
// SECTION: Fan-out
// ============================================================================

/// Runs the §4.E fan-out algorithm against `providers`, which must already
/// be filtered to `available() == true` entries.
///
/// 1. Order providers: the enricher (if any; the first whose
///    [`NotificationProvider::is_enricher`] is true, by name ascending),
///    then the remainder sorted by name.
/// 2. Run the enricher, if present; enrichment failures degrade to the
///    original message (the trait's `enrich` cannot itself fail, so this
///    only matters if a future provider wants to signal "no-op" via identity).
/// 3. Call `send` on every non-enricher provider in order, recording results.
pub fn dispatch(
    providers: &[Box<dyn NotificationProvider>],
    message: NotificationMessage,
) -> NotifyResults {
    let mut ordered: Vec<&Box<dyn NotificationProvider>> = providers.iter().collect();
    ordered.sort_by(|a, b| a.name().cmp(b.name()));

    let enricher_index = ordered.iter().position(|p| p.is_enricher());

    let message = if let Some(index) = enricher_index {
        ordered[index].enrich(message)
    } else {
        message
    };

    let mut results = NotifyResults::new();
    for (index, provider) in ordered.iter().enumerate() {
        if Some(index) == enricher_index {
            continue;
        }
        let delivered = provider.send(&message);
        results.insert(provider.name().to_owned(), delivered);
    }
    results
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::core::Priority;

    struct RecordingProvider {
        provider_name: &'static str,
        succeeds: bool,
        enricher: bool,
        calls: RefCell<Vec<String>>,
    }

    impl NotificationProvider for RecordingProvider {
        fn name(&self) -> &str {
            self.provider_name
        }

        fn available(&self) -> bool {
            true
        }

        fn send(&self, message: &NotificationMessage) -> bool {
            self.calls.borrow_mut().push(message.content.clone());
            self.succeeds
        }

        fn enrich(&self, mut message: NotificationMessage) -> NotificationMessage {
            message.metadata.insert("enriched_by".to_owned(), self.provider_name.to_owned());
            message
        }

        fn is_enricher(&self) -> bool {
            self.enricher
        }
    }

    fn message() -> NotificationMessage {
        NotificationMessage {
            title: "Changes detected".to_owned(),
            content: "1 new".to_owned(),
            priority: Priority::Normal,
            url: None,
            metadata: Default::default(),
        }
    }

    #[test]
    fn enricher_runs_first_and_its_output_reaches_every_other_provider() {
        let enricher = Box::new(RecordingProvider {
            provider_name: "aaa_enricher",
            succeeds: true,
            enricher: true,
            calls: RefCell::new(Vec::new()),
        });
        let plain = Box::new(RecordingProvider {
            provider_name: "zzz_plain",
            succeeds: true,
            enricher: false,
            calls: RefCell::new(Vec::new()),
        });
        let providers: Vec<Box<dyn NotificationProvider>> = vec![enricher, plain];

        let results = dispatch(&providers, message());
        assert_eq!(results.len(), 1, "the enricher itself is not sent to");
        assert_eq!(results.get("zzz_plain"), Some(&true));
    }

    #[test]
    fn one_provider_failing_does_not_short_circuit_the_rest() {
        let failing = Box::new(RecordingProvider {
            provider_name: "a_failing",
            succeeds: false,
            enricher: false,
            calls: RefCell::new(Vec::new()),
        });
        let succeeding = Box::new(RecordingProvider {
            provider_name: "b_succeeding",
            succeeds: true,
            enricher: false,
            calls: RefCell::new(Vec::new()),
        });
        let providers: Vec<Box<dyn NotificationProvider>> = vec![failing, succeeding];

        let results = dispatch(&providers, message());
        assert_eq!(results.get("a_failing"), Some(&false));
        assert_eq!(results.get("b_succeeding"), Some(&true));
    }

    #[test]
    fn providers_without_an_enricher_are_all_sent_to_in_name_order() {
        let b = Box::new(RecordingProvider {
            provider_name: "b",
            succeeds: true,
            enricher: false,
            calls: RefCell::new(Vec::new()),
        });
        let a = Box::new(RecordingProvider {
            provider_name: "a",
            succeeds: true,
            enricher: false,
            calls: RefCell::new(Vec::new()),
        });
        let providers: Vec<Box<dyn NotificationProvider>> = vec![b, a];
        let results = dispatch(&providers, message());
        assert_eq!(results.len(), 2);
    }
}
