// crates/gradewatch-config/src/lib.rs
// ============================================================================
// Module: Gradewatch Config
// Description: TOML + environment configuration loading for Gradewatch.
// Purpose: Resolve, validate, and expose the operator-facing settings surface.
// Dependencies: gradewatch-core, serde, toml
// ============================================================================

pub mod config;

pub use config::ApiConfig;
pub use config::ConfigError;
pub use config::FileNotificationConfig;
pub use config::GradewatchConfig;
pub use config::HealthcheckConfig;
pub use config::JournalConfig;
pub use config::LogConfig;
pub use config::NotificationsConfig;
pub use config::RetryConfig;
pub use config::StorageConfig;
pub use config::WebhookNotificationConfig;
