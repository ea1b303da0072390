// crates/gradewatch-providers/src/file_provider.rs
// ============================================================================
// Module: File Provider
// Description: Appends the formatted message to a local file.
// Purpose: Reference provider for testing and air-gapped setups.
// Dependencies: gradewatch-core
// ============================================================================

//! ## Overview
//! Grounded on the same append-only writer idiom as the change journal
//! (`Mutex<BufWriter<File>>`, `OpenOptions::append(true)`): open once at
//! construction, then write-and-flush per call so every delivery is durable
//! before `send` returns.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use gradewatch_core::core::NotificationMessage;
use gradewatch_core::interfaces::NotificationProvider;

/// Appends `"[priority] title: content"` lines to a file. `available()` is
/// true iff the file could be opened at construction.
pub struct FileProvider {
    writer: Option<Mutex<BufWriter<File>>>,
}

impl FileProvider {
    /// Opens (creating/appending to) `path`. If the file cannot be opened,
    /// the provider is built but reports `available() == false`.
    #[must_use]
    pub fn open(path: &Path) -> Self {
        let writer = OpenOptions::new().create(true).append(true).open(path).ok().map(|file| Mutex::new(BufWriter::new(file)));
        Self { writer }
    }
}

impl NotificationProvider for FileProvider {
    fn name(&self) -> &str {
        "file"
    }

    fn available(&self) -> bool {
        self.writer.is_some()
    }

    fn send(&self, message: &NotificationMessage) -> bool {
        let Some(writer) = self.writer.as_ref() else {
            return false;
        };
        let Ok(mut writer) = writer.lock() else {
            return false;
        };
        let line = format!("[{}] {}: {}\n", message.priority, message.title, message.content);
        writer.write_all(line.as_bytes()).is_ok() && writer.flush().is_ok()
    }
}
