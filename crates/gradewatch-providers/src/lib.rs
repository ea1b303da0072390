// crates/gradewatch-providers/src/lib.rs
// ============================================================================
// Module: Gradewatch Providers
// Description: Built-in NotificationProvider implementations.
// Purpose: Give gradewatch-cli ready-made log, webhook, and file transports.
// Dependencies: gradewatch-core
// ============================================================================

//! ## Overview
//! Reference [`gradewatch_core::interfaces::NotificationProvider`]
//! implementations: a bounded `reqwest::blocking` client for webhook
//! delivery, and the standard append-only-file idiom for file output.

pub mod file_provider;
pub mod health;
pub mod log_provider;
pub mod webhook;

pub use file_provider::FileProvider;
pub use health::HttpHealthPing;
pub use log_provider::LogProvider;
pub use webhook::WebhookProvider;
