// crates/gradewatch-store-sqlite/src/lib.rs
// ============================================================================
// Module: Gradewatch SQLite Store
// Description: Durable SnapshotStore backed by SQLite.
// Purpose: Persist the current snapshot with precision-preserving decimals.
// Dependencies: gradewatch-core, rusqlite
// ============================================================================

//! ## Overview
//! A [`gradewatch_core::interfaces::SnapshotStore`] backed by a single
//! `SQLite` connection behind a `Mutex`. Gradewatch has exactly one writer
//! (per spec §4.B/§5), so there is no need for a dedicated writer thread and
//! gateway; a synchronous, mutex-guarded connection is sufficient and
//! considerably simpler.

pub mod store;

pub use store::SqliteSnapshotStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
