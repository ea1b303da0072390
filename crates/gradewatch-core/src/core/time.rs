// crates/gradewatch-core/src/core/time.rs
// ============================================================================
// Module: Timestamp Formatting
// Description: RFC3339 parse/format helpers shared by the store, journal, and differ.
// Purpose: Keep date handling locale-agnostic and UTC-consistent per §6.
// Dependencies: time
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Parse / Format
// ============================================================================

/// Parses an RFC3339 timestamp.
///
/// # Errors
///
/// Returns the underlying [`time::error::Parse`] when `value` is not a valid
/// RFC3339 timestamp.
pub fn parse_rfc3339(value: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(value, &Rfc3339)
}

/// Renders a timestamp as RFC3339.
///
/// # Errors
///
/// Returns the underlying [`time::error::Format`] on formatting failure,
/// which does not occur for any in-range `OffsetDateTime`.
pub fn format_rfc3339(value: OffsetDateTime) -> Result<String, time::error::Format> {
    value.format(&Rfc3339)
}

/// Renders a timestamp using the locale-agnostic `YYYY-MM-DD HH:MM` form
/// used in notification content and change `old`/`new` values, in UTC.
#[must_use]
pub fn format_due_date(value: OffsetDateTime) -> String {
    let value = value.to_offset(time::UtcOffset::UTC);
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}",
        value.year(),
        u8::from(value.month()),
        value.day(),
        value.hour(),
        value.minute()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_rfc3339() {
        let parsed = parse_rfc3339("2026-03-05T09:00:00Z").unwrap();
        assert_eq!(format_rfc3339(parsed).unwrap(), "2026-03-05T09:00:00Z");
    }

    #[test]
    fn format_due_date_uses_utc_minute_precision() {
        let parsed = parse_rfc3339("2026-03-05T09:30:00Z").unwrap();
        assert_eq!(format_due_date(parsed), "2026-03-05 09:30");
    }
}
