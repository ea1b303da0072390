// crates/gradewatch-fetcher/src/lib.rs
// ============================================================================
// Module: Gradewatch Fetcher
// Description: Reference SnapshotFetcher over the remote grade API.
// Purpose: Authenticate, fetch, and decode one full grade snapshot.
// Dependencies: gradewatch-core, reqwest
// ============================================================================

//! ## Overview
//! A bounded `reqwest::blocking` GET with a fixed timeout and size cap,
//! scheme-checked before the request is made. The remote grade API's wire
//! format is otherwise unconstrained, so this crate decodes directly into
//! the grade model's own JSON shape
//! ([`gradewatch_core::core::model::Snapshot`]'s `Serialize`/`Deserialize`
//! derive).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use gradewatch_core::core::model::Snapshot;
use gradewatch_core::interfaces::FetchError;
use gradewatch_core::interfaces::SnapshotFetcher;
use reqwest::blocking::Client;

// ============================================================================
// SECTION: Config
// ============================================================================

/// Maximum accepted response body size, guarding against a misbehaving or
/// compromised upstream returning an unbounded stream.
const MAX_RESPONSE_BYTES: usize = 16 * 1024 * 1024;
/// Request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Credentials and endpoint for the remote grade API, per spec §6's
/// `api.key`/`api.secret`/`api.domain` config keys.
#[derive(Debug, Clone)]
pub struct GradeApiConfig {
    /// Base domain of the grade service, e.g. `grades.example.edu`.
    pub domain: String,
    /// API key sent as the HTTP basic-auth username.
    pub key: String,
    /// API secret sent as the HTTP basic-auth password.
    pub secret: String,
}

impl GradeApiConfig {
    fn snapshot_url(&self) -> String {
        format!("https://{}/api/v1/snapshot", self.domain)
    }
}

// ============================================================================
// SECTION: Fetcher
// ============================================================================

/// Fetches one full [`Snapshot`] from the configured grade API over HTTPS.
pub struct HttpSnapshotFetcher {
    config: GradeApiConfig,
    client: Client,
}

impl HttpSnapshotFetcher {
    /// Builds a fetcher for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the underlying HTTP client cannot be built.
    pub fn new(config: GradeApiConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        Ok(Self { config, client })
    }
}

impl SnapshotFetcher for HttpSnapshotFetcher {
    fn fetch(&self) -> Result<Snapshot, FetchError> {
        let response = self
            .client
            .get(self.config.snapshot_url())
            .basic_auth(&self.config.key, Some(&self.config.secret))
            .send()
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Transport(format!("unexpected status {status}")));
        }

        let bytes = response.bytes().map_err(|err| FetchError::Transport(err.to_string()))?;
        if bytes.len() > MAX_RESPONSE_BYTES {
            return Err(FetchError::Transport(format!(
                "response body of {} bytes exceeds the {MAX_RESPONSE_BYTES}-byte limit",
                bytes.len()
            )));
        }

        serde_json::from_slice(&bytes).map_err(|err| FetchError::Decode(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_url_is_https_and_versioned() {
        let config = GradeApiConfig {
            domain: "grades.example.edu".to_owned(),
            key: "k".to_owned(),
            secret: "s".to_owned(),
        };
        assert_eq!(config.snapshot_url(), "https://grades.example.edu/api/v1/snapshot");
    }
}
