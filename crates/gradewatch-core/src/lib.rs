// crates/gradewatch-core/src/lib.rs
// ============================================================================
// Module: Gradewatch Core
// Description: Normalized data model, differ, notification fan-out, and orchestrator.
// Purpose: The change-detection and persistence engine driving one pipeline cycle.
// Dependencies: (submodules)
// ============================================================================

//! ## Overview
//! Gradewatch watches a remote grade service for changes. At each scheduled
//! tick it fetches a full snapshot, compares it against the locally
//! persisted one using stable identifiers only, emits a categorized
//! [`core::ChangeReport`], fans a [`core::NotificationMessage`] out to
//! notification providers, appends the report to a change journal, and
//! atomically persists the new snapshot.
//!
//! This crate owns the hard part: the data model, the ID-based differ, the
//! notification fan-out algorithm, and the pipeline orchestrator. The
//! remote API client, concrete notification transports, the durable store
//! backend, and the change journal's file format are implemented in
//! sibling crates against the traits in [`interfaces`].

pub mod core;
pub mod interfaces;
pub mod runtime;
