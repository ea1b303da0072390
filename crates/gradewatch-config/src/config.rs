// crates/gradewatch-config/src/config.rs
// ============================================================================
// Module: Gradewatch Configuration
// Description: Configuration loading and validation for Gradewatch.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: gradewatch-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path
//! limits, then overlaid with environment variables, matching how an
//! operator-facing settings source is treated in the rest of this system:
//! untrusted until validated, and fail-closed on anything unrecognized.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use gradewatch_core::runtime::scheduler::ScrapeTime;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "gradewatch.toml";
/// Environment variable used to override the config path.
const CONFIG_ENV_VAR: &str = "GRADEWATCH_CONFIG";
/// Maximum configuration file size in bytes.
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;

/// Default `storage.timeout_ms`.
const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 30_000;
/// Default `retry.max_attempts`.
const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;
/// Default `retry.delay_ms`.
const DEFAULT_RETRY_DELAY_MS: u64 = 5_000;
/// Default `journal.retention_days`.
const DEFAULT_RETENTION_DAYS: i64 = 90;
/// Default `log.level`.
const DEFAULT_LOG_LEVEL: &str = "info";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Top-level Gradewatch configuration, per spec §6's configuration table.
#[derive(Debug, Clone, Deserialize)]
pub struct GradewatchConfig {
    /// Remote grade API credentials.
    #[serde(default)]
    pub api: ApiConfig,
    /// Comma-separated `HH:MM` schedule, e.g. `"07:00,18:30"`.
    #[serde(default)]
    pub scrape_times: String,
    /// Snapshot store configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Fetch retry configuration.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Change journal configuration.
    #[serde(default)]
    pub journal: JournalConfig,
    /// Notification provider configuration.
    #[serde(default)]
    pub notifications: NotificationsConfig,
    /// Uptime health-ping configuration.
    #[serde(default)]
    pub healthcheck: HealthcheckConfig,
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
}

impl Default for GradewatchConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            scrape_times: String::new(),
            storage: StorageConfig::default(),
            retry: RetryConfig::default(),
            journal: JournalConfig::default(),
            notifications: NotificationsConfig::default(),
            healthcheck: HealthcheckConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl GradewatchConfig {
    /// Loads configuration using the default resolution rules: an explicit
    /// `path`, else `GRADEWATCH_CONFIG`, else `gradewatch.toml` in the
    /// working directory if it exists, else built-in defaults. Environment
    /// variables are then overlaid and the result is validated fail-closed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file exists but cannot be read or
    /// parsed, or when the resulting configuration fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;

        let mut config = if resolved.exists() {
            let metadata = fs::metadata(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
            if metadata.len() > MAX_CONFIG_FILE_SIZE {
                return Err(ConfigError::Invalid("config file exceeds size limit".to_owned()));
            }
            let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
            let content = std::str::from_utf8(&bytes)
                .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_owned()))?;
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Overlays recognized environment variables onto the parsed file,
    /// per spec §6 ("Recognized options, from environment and/or a
    /// settings file").
    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("GRADEWATCH_API_KEY") {
            self.api.key = value;
        }
        if let Ok(value) = env::var("GRADEWATCH_API_SECRET") {
            self.api.secret = value;
        }
        if let Ok(value) = env::var("GRADEWATCH_API_DOMAIN") {
            self.api.domain = value;
        }
        if let Ok(value) = env::var("GRADEWATCH_SCRAPE_TIMES") {
            self.scrape_times = value;
        }
        if let Ok(value) = env::var("GRADEWATCH_LOG_LEVEL") {
            self.log.level = value;
        }
        if let Ok(value) = env::var("GRADEWATCH_HEALTHCHECK_URL") {
            self.healthcheck.url = Some(value);
        }
    }

    /// Validates the configuration for internal consistency, failing
    /// closed on anything malformed or missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api.validate()?;
        if !self.scrape_times.trim().is_empty() {
            ScrapeTime::parse_list(&self.scrape_times)
                .map_err(|err| ConfigError::Invalid(format!("scrape_times: {err}")))?;
        }
        self.storage.validate()?;
        self.retry.validate()?;
        self.journal.validate()?;
        self.notifications.validate()?;
        self.log.validate()?;
        Ok(())
    }

    /// Parses `scrape_times` into the scheduler's representation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when any entry is not a valid `HH:MM` value.
    pub fn parsed_scrape_times(&self) -> Result<Vec<ScrapeTime>, ConfigError> {
        if self.scrape_times.trim().is_empty() {
            return Ok(Vec::new());
        }
        ScrapeTime::parse_list(&self.scrape_times)
            .map_err(|err| ConfigError::Invalid(format!("scrape_times: {err}")))
    }
}

/// Remote grade API credentials, per spec §6 (`api.key`, `api.secret`,
/// `api.domain`), opaque to the core.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    /// API key, sent as the HTTP basic-auth username.
    #[serde(default)]
    pub key: String,
    /// API secret, sent as the HTTP basic-auth password.
    #[serde(default)]
    pub secret: String,
    /// Base domain of the grade service.
    #[serde(default)]
    pub domain: String,
}

impl ApiConfig {
    /// Validates that all three credential fields are present.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.key.trim().is_empty() || self.secret.trim().is_empty() || self.domain.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "api.key, api.secret, and api.domain are all required".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Snapshot store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Filesystem path to the snapshot store.
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
    /// Max wait for store write locks.
    #[serde(default = "default_storage_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { path: default_storage_path(), timeout_ms: default_storage_timeout_ms() }
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("storage.path", &self.path.to_string_lossy())?;
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("storage.timeout_ms must be greater than zero".to_owned()));
        }
        Ok(())
    }
}

/// Fetch retry configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Fetch retry count.
    #[serde(default = "default_retry_max_attempts")]
    pub max_attempts: u32,
    /// Inter-attempt delay.
    #[serde(default = "default_retry_delay_ms")]
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: default_retry_max_attempts(), delay_ms: default_retry_delay_ms() }
    }
}

impl RetryConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid("retry.max_attempts must be greater than zero".to_owned()));
        }
        Ok(())
    }
}

/// Change journal configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JournalConfig {
    /// Filesystem path to the append-only change journal.
    #[serde(default = "default_journal_path")]
    pub path: PathBuf,
    /// Prune horizon, in days.
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self { path: default_journal_path(), retention_days: default_retention_days() }
    }
}

impl JournalConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("journal.path", &self.path.to_string_lossy())?;
        if self.retention_days < 0 {
            return Err(ConfigError::Invalid("journal.retention_days must not be negative".to_owned()));
        }
        Ok(())
    }
}

/// Per-provider notification configuration, per spec §6
/// (`notifications.<provider>.*`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationsConfig {
    /// Webhook provider configuration.
    #[serde(default)]
    pub webhook: Option<WebhookNotificationConfig>,
    /// File provider configuration.
    #[serde(default)]
    pub file: Option<FileNotificationConfig>,
}

impl NotificationsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(webhook) = &self.webhook {
            webhook.validate()?;
        }
        if let Some(file) = &self.file {
            file.validate()?;
        }
        Ok(())
    }
}

/// Webhook provider configuration. A provider is "available" iff its
/// mandatory subset is present, per spec §6; here that subset is `url`.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookNotificationConfig {
    /// Destination URL for outbound POSTs.
    pub url: String,
}

impl WebhookNotificationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let trimmed = self.url.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Invalid("notifications.webhook.url must be non-empty".to_owned()));
        }
        if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
            return Err(ConfigError::Invalid(
                "notifications.webhook.url must include http:// or https://".to_owned(),
            ));
        }
        Ok(())
    }
}

/// File provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FileNotificationConfig {
    /// Destination path for appended notification lines.
    pub path: PathBuf,
}

impl FileNotificationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("notifications.file.path", &self.path.to_string_lossy())
    }
}

/// Uptime health-ping configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthcheckConfig {
    /// If set, the orchestrator pings it with query `?status=ok|fail`.
    #[serde(default)]
    pub url: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// One of `debug|info|warn|error`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

impl LogConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        match self.level.as_str() {
            "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(ConfigError::Invalid(format!("log.level {other:?} is not one of debug|info|warn|error"))),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_owned()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_owned()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_owned()));
        }
    }
    Ok(())
}

fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("gradewatch.db")
}

fn default_journal_path() -> PathBuf {
    PathBuf::from("gradewatch-journal.ndjson")
}

const fn default_storage_timeout_ms() -> u64 {
    DEFAULT_STORAGE_TIMEOUT_MS
}

const fn default_retry_max_attempts() -> u32 {
    DEFAULT_RETRY_MAX_ATTEMPTS
}

const fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}

const fn default_retention_days() -> i64 {
    DEFAULT_RETENTION_DAYS
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_owned()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
