// crates/gradewatch-journal/src/lib.rs
// ============================================================================
// Module: Gradewatch Journal
// Description: NDJSON-backed ChangeJournal implementation.
// Purpose: Append one structured record per non-empty ChangeReport, with retention pruning.
// Dependencies: gradewatch-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Built on the standard append-only ledger/journal writer idiom
//! (`Mutex<BufWriter<File>>`, `OpenOptions::create().append(true)`,
//! `writeln!` + `flush`) rather than a SQL-backed audit log: §4.D calls for
//! "a second file" with "one structured record per line", which is an
//! NDJSON file contract, not a query-able table.

pub mod journal;

pub use journal::JournalEntry;
pub use journal::NdjsonChangeJournal;
