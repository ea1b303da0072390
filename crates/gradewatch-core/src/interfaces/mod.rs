// crates/gradewatch-core/src/interfaces/mod.rs
// ============================================================================
// Module: Gradewatch Interfaces
// Description: Backend-agnostic interfaces for fetching, storage, notification, and health.
// Purpose: Define the contract surfaces the orchestrator composes.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how the pipeline integrates with external systems
//! without embedding backend-specific details: the remote grade API client,
//! the durable snapshot store, notification transports, and an uptime
//! health-ping endpoint are all out of scope for this crate and are
//! represented here only by the shape the orchestrator depends on.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use thiserror::Error;
use time::OffsetDateTime;

use crate::core::AssignmentId;
use crate::core::CategoryId;
use crate::core::PeriodId;
use crate::core::model::Assignment;
use crate::core::model::Category;
use crate::core::notification::NotificationMessage;

// ============================================================================
// SECTION: Snapshot Fetcher
// ============================================================================

/// Fetch errors surfaced to the orchestrator's retry loop.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The remote source could not be reached or responded with an error.
    #[error("snapshot fetch failed: {0}")]
    Transport(String),
    /// The remote source returned data that could not be decoded.
    #[error("snapshot decode failed: {0}")]
    Decode(String),
}

/// Produces a full grade [`crate::core::model::Snapshot`] from the remote
/// source. Authentication, HTTP, and JSON decoding are the implementation's
/// concern; this crate receives only the resulting value.
pub trait SnapshotFetcher {
    /// Fetches one full snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the snapshot cannot be obtained or decoded.
    fn fetch(&self) -> Result<crate::core::model::Snapshot, FetchError>;
}

// ============================================================================
// SECTION: Snapshot Store
// ============================================================================

/// An assignment alongside the section/period/category context it was
/// observed under, as returned by [`SnapshotStore::get_assignment`].
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentContext {
    /// Title of the owning section at observation time.
    pub section_title: String,
    /// Name of the owning period at observation time.
    pub period_name: String,
    /// Name of the owning category at observation time.
    pub category_name: String,
    /// The assignment itself.
    pub assignment: Assignment,
}

/// Snapshot store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("snapshot store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("snapshot store corruption: {0}")]
    Corrupt(String),
    /// Store data version is incompatible.
    #[error("snapshot store version mismatch: {0}")]
    VersionMismatch(String),
}

/// Durable, ID-keyed storage of the current snapshot, per §4.B.
///
/// # Invariants
/// - Single-writer; `replace_all` is atomic.
/// - After a successful `replace_all(s)`, every lookup reflects exactly `s`.
pub trait SnapshotStore {
    /// Returns the observation timestamp of the current snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn latest_timestamp(&self) -> Result<Option<OffsetDateTime>, StoreError>;

    /// Looks up a single assignment by its globally unique identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn get_assignment(
        &self,
        id: &AssignmentId,
    ) -> Result<Option<AssignmentContext>, StoreError>;

    /// Looks up a category (without its assignments) by compound key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn get_category(
        &self,
        category_id: &CategoryId,
        period_id: &PeriodId,
    ) -> Result<Option<Category>, StoreError>;

    /// Iterates every stored assignment.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn iter_assignments(&self) -> Result<Vec<AssignmentContext>, StoreError>;

    /// Atomically replaces the current snapshot with `snapshot`. Either the
    /// entire new snapshot is visible after return, or the old one remains.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the transaction cannot be committed.
    fn replace_all(&self, snapshot: &crate::core::model::Snapshot) -> Result<(), StoreError>;

    /// Wipes every row, including `meta`. Test-only.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O failure.
    fn clear_all(&self) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Notification Provider
// ============================================================================

/// Notification provider errors.
///
/// # Invariants
/// - A provider implementation must never let an internal error escape
///   `send`; this type exists for providers that choose to report detail
///   through other channels (e.g. logging) while still returning `false`.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The provider could not deliver the message.
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// A notification transport, per §4.E. Concrete transports (mobile push,
/// email, webhook, AI summarization) are out of scope for this crate; it
/// depends only on this interface.
pub trait NotificationProvider {
    /// Stable short identifier, used for fan-out ordering and journal results.
    fn name(&self) -> &str;

    /// Configuration-based availability check. Providers whose `available()`
    /// returns false are never instantiated into the active set.
    fn available(&self) -> bool;

    /// Attempts one delivery. Must catch all provider-internal errors and
    /// surface them as `false`; this method itself never raises.
    fn send(&self, message: &NotificationMessage) -> bool;

    /// Optionally augments the message with provider-contributed metadata.
    /// At most one enricher runs per cycle, chosen by name, ascending.
    /// Default: no enrichment.
    fn enrich(&self, message: NotificationMessage) -> NotificationMessage {
        message
    }

    /// True iff this provider offers [`Self::enrich`] beyond the identity
    /// default. The manager uses this to select the single active enricher.
    fn is_enricher(&self) -> bool {
        false
    }
}

/// Per-provider fan-out results, keyed by provider name.
pub type NotifyResults = BTreeMap<String, bool>;

// ============================================================================
// SECTION: Health Ping
// ============================================================================

/// Health-ping errors. Never fails the cycle; surfaced only for logging.
#[derive(Debug, Error)]
pub enum HealthPingError {
    /// The health endpoint could not be reached.
    #[error("health ping failed: {0}")]
    Unreachable(String),
}

/// An uptime health-ping endpoint, invoked at the end of every cycle.
pub trait HealthPing {
    /// Reports cycle outcome to the external uptime service.
    ///
    /// # Errors
    ///
    /// Returns [`HealthPingError`] on failure; callers must log and ignore it.
    fn ping(&self, success: bool) -> Result<(), HealthPingError>;
}

/// A [`HealthPing`] that does nothing; used when `healthcheck.url` is unset.
pub struct NoopHealthPing;

impl HealthPing for NoopHealthPing {
    fn ping(&self, _success: bool) -> Result<(), HealthPingError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Change Journal
// ============================================================================

/// Per-provider notification outcome recorded alongside a journal entry.
pub type JournalNotifyResults = BTreeMap<String, bool>;

/// One append-only journal record, per §4.D.
///
/// A fetch failure is recorded with `error` set and `report` describing a
/// zero-change, non-initial cycle — there was no snapshot to diff, but the
/// cycle still happened and belongs in the audit trail.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalRecord<'a> {
    /// The change report this record describes. Has no changes when `error`
    /// is set.
    pub report: &'a crate::core::ChangeReport,
    /// Per-provider notification results, if the notify step ran.
    pub notify_results: &'a JournalNotifyResults,
    /// Set when this record documents a fetch failure rather than a
    /// completed diff.
    pub error: Option<&'a str>,
}

/// Change journal errors. Per §4.D, write failures never fail the pipeline;
/// callers log this at warning level and swallow it.
#[derive(Debug, Error)]
pub enum JournalError {
    /// The journal could not be written to.
    #[error("change journal io error: {0}")]
    Io(String),
}

/// Append-only structured sink for every non-empty [`crate::core::ChangeReport`].
pub trait ChangeJournal {
    /// Appends one record. Never called for an empty, non-initial report
    /// (the orchestrator skips those per §4.G step 4).
    ///
    /// # Errors
    ///
    /// Returns [`JournalError`] on I/O failure. Callers must log and swallow it.
    fn append(&self, record: &JournalRecord<'_>) -> Result<(), JournalError>;

    /// Prunes records older than the configured retention horizon. Must be
    /// idempotent: re-running prune with no newly-expired records is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError`] on I/O failure.
    fn prune(&self, now: OffsetDateTime) -> Result<(), JournalError>;
}
