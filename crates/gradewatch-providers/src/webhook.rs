// crates/gradewatch-providers/src/webhook.rs
// ============================================================================
// Module: Webhook Provider
// Description: Posts a NotificationMessage as JSON to a configured URL.
// Purpose: The reference HTTP delivery transport, and the sole enricher.
// Dependencies: gradewatch-core, reqwest
// ============================================================================

//! ## Overview
//! A bounded `reqwest::blocking` client with a fixed per-request timeout.
//! The webhook target is operator-configured, not resolved from untrusted
//! input, so this provider has no host allowlist or private-network
//! blocking — there is no SSRF surface to defend against here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use gradewatch_core::core::NotificationMessage;
use gradewatch_core::interfaces::NotificationProvider;
use reqwest::blocking::Client;

/// Per-provider send timeout, per spec §5 ("bounded by a per-provider
/// timeout, default 30 s").
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// POSTs the message as a JSON body to `url`. `available()` iff a URL is
/// configured. The sole built-in enricher: when available, it augments the
/// message's metadata with the `dispatch_url` it is about to post to.
pub struct WebhookProvider {
    url: Option<String>,
    client: Client,
}

impl WebhookProvider {
    /// Builds a provider targeting `url`, if configured.
    #[must_use]
    pub fn new(url: Option<String>) -> Self {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build().unwrap_or_else(|_| Client::new());
        Self { url, client }
    }
}

impl NotificationProvider for WebhookProvider {
    fn name(&self) -> &str {
        "webhook"
    }

    fn available(&self) -> bool {
        self.url.is_some()
    }

    fn send(&self, message: &NotificationMessage) -> bool {
        let Some(url) = self.url.as_deref() else {
            return false;
        };
        self.client.post(url).json(message).send().is_ok_and(|response| response.status().is_success())
    }

    fn enrich(&self, mut message: NotificationMessage) -> NotificationMessage {
        if let Some(url) = self.url.as_deref() {
            message.metadata.insert("dispatch_url".to_owned(), url.to_owned());
        }
        message
    }

    fn is_enricher(&self) -> bool {
        self.url.is_some()
    }
}

#[cfg(test)]
mod tests {
    use gradewatch_core::core::Priority;

    use super::*;

    fn message() -> NotificationMessage {
        NotificationMessage {
            title: "Changes detected".to_owned(),
            content: "1 new".to_owned(),
            priority: Priority::Normal,
            url: None,
            metadata: std::collections::BTreeMap::new(),
        }
    }

    #[test]
    fn unavailable_without_a_configured_url() {
        let provider = WebhookProvider::new(None);
        assert!(!provider.available());
        assert!(!provider.is_enricher());
        assert!(!provider.send(&message()));
    }

    #[test]
    fn enrich_adds_the_dispatch_url_when_configured() {
        let provider = WebhookProvider::new(Some("https://example.invalid/hook".to_owned()));
        assert!(provider.is_enricher());
        let enriched = provider.enrich(message());
        assert_eq!(enriched.metadata.get("dispatch_url"), Some(&"https://example.invalid/hook".to_owned()));
    }
}
