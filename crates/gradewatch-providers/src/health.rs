// crates/gradewatch-providers/src/health.rs
// ============================================================================
// Module: HTTP Health Ping
// Description: Pings an uptime endpoint with the cycle's success/failure status.
// Purpose: Implement the §6 `healthcheck.url` contract.
// Dependencies: gradewatch-core, reqwest
// ============================================================================

//! ## Overview
//! Grounded on [`crate::webhook::WebhookProvider`]'s bounded
//! `reqwest::blocking` client. Per §7, a health-ping failure is logged at
//! info level and never fails the cycle; this type's `ping` reflects that in
//! its return type, leaving the "log and ignore" decision to the caller.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use gradewatch_core::interfaces::HealthPing;
use gradewatch_core::interfaces::HealthPingError;
use reqwest::blocking::Client;

/// Per-ping timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Pings `url` with query `?status=ok|fail`, per spec §6.
pub struct HttpHealthPing {
    url: String,
    client: Client,
}

impl HttpHealthPing {
    /// Builds a health ping targeting `url`.
    #[must_use]
    pub fn new(url: String) -> Self {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build().unwrap_or_else(|_| Client::new());
        Self { url, client }
    }
}

impl HealthPing for HttpHealthPing {
    fn ping(&self, success: bool) -> Result<(), HealthPingError> {
        let status = if success { "ok" } else { "fail" };
        let response = self
            .client
            .get(&self.url)
            .query(&[("status", status)])
            .send()
            .map_err(|err| HealthPingError::Unreachable(err.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(HealthPingError::Unreachable(format!("unexpected status {}", response.status())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_host_is_reported_as_an_error() {
        let ping = HttpHealthPing::new("http://127.0.0.1:1/healthcheck".to_owned());
        assert!(ping.ping(true).is_err());
    }
}
