// crates/gradewatch-core/src/runtime/scheduler.rs
// ============================================================================
// Module: Scheduler Timing
// Description: Pure computation of the next scheduled run instant.
// Purpose: Keep daemon-mode timing logic testable without a real clock or sleeper.
// Dependencies: time
// ============================================================================

//! ## Overview
//! This module computes *when* the next cycle should run; it does not sleep
//! or loop. The sleep-and-run loop, which must be interruptible by a
//! shutdown signal, lives in the process entry point alongside the rest of
//! the I/O the core intentionally does not own.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use time::Duration;
use time::OffsetDateTime;
use time::Time;

// ============================================================================
// SECTION: Scrape Time
// ============================================================================

/// A wall-clock `HH:MM` entry in the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScrapeTime {
    time: Time,
}

/// Rejected when an entry in `scrape_times` is not a valid `HH:MM` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeTimeParseError {
    input: String,
}

impl fmt::Display for ScrapeTimeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid scrape time \"{}\", expected HH:MM", self.input)
    }
}

impl std::error::Error for ScrapeTimeParseError {}

impl ScrapeTime {
    /// Parses one `HH:MM` entry.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeTimeParseError`] when `input` is not `HH:MM` with
    /// `00 <= HH <= 23` and `00 <= MM <= 59`.
    pub fn parse(input: &str) -> Result<Self, ScrapeTimeParseError> {
        let invalid = || ScrapeTimeParseError { input: input.to_owned() };
        let (hour, minute) = input.split_once(':').ok_or_else(invalid)?;
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        let time = Time::from_hms(hour, minute, 0).map_err(|_| invalid())?;
        Ok(Self { time })
    }

    /// Parses a comma-separated `scrape_times` configuration value.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeTimeParseError`] on the first malformed entry.
    pub fn parse_list(value: &str) -> Result<Vec<Self>, ScrapeTimeParseError> {
        value.split(',').map(str::trim).map(Self::parse).collect()
    }
}

// ============================================================================
// SECTION: Next Run
// ============================================================================

/// Computes the smallest instant `>= now` whose local `HH:MM` is in `times`.
/// If no entry in `times` is `>= now`'s time-of-day, returns the smallest
/// entry on the following day.
///
/// # Panics
///
/// Panics only if `times` is empty; callers must enforce non-empty schedules
/// at configuration-validation time (a fatal configuration error per §7).
#[must_use]
pub fn next(now: OffsetDateTime, times: &[ScrapeTime]) -> OffsetDateTime {
    assert!(!times.is_empty(), "scrape_times must be validated non-empty before scheduling");

    let mut sorted = times.to_vec();
    sorted.sort();

    let today = now.date();
    let now_time = now.time();

    if let Some(candidate) = sorted.iter().find(|t| t.time >= now_time) {
        return today.with_time(candidate.time).assume_offset(now.offset());
    }

    let tomorrow = today + Duration::days(1);
    tomorrow.with_time(sorted[0].time).assume_offset(now.offset())
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn times(values: &[&str]) -> Vec<ScrapeTime> {
        values.iter().map(|v| ScrapeTime::parse(v).unwrap()).collect()
    }

    #[test]
    fn picks_the_next_time_later_today() {
        let now = datetime!(2026-03-05 08:00 UTC);
        let schedule = times(&["07:00", "09:00", "21:00"]);
        assert_eq!(next(now, &schedule), datetime!(2026-03-05 09:00 UTC));
    }

    #[test]
    fn wraps_to_tomorrow_when_nothing_remains_today() {
        let now = datetime!(2026-03-05 22:00 UTC);
        let schedule = times(&["07:00", "09:00"]);
        assert_eq!(next(now, &schedule), datetime!(2026-03-06 07:00 UTC));
    }

    #[test]
    fn exact_boundary_counts_as_next() {
        let now = datetime!(2026-03-05 09:00 UTC);
        let schedule = times(&["09:00"]);
        assert_eq!(next(now, &schedule), datetime!(2026-03-05 09:00 UTC));
    }

    #[test]
    fn rejects_malformed_entries() {
        assert!(ScrapeTime::parse("25:00").is_err());
        assert!(ScrapeTime::parse("9am").is_err());
        assert!(ScrapeTime::parse_list("07:00, 09:00, nope").is_err());
    }
}
