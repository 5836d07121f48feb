//! Utility functions for CLI operations.

use anyhow::{Result, bail};
use time::OffsetDateTime;

/// Parse a date/time string in RFC3339 or YYYY-MM-DD format.
pub fn parse_datetime(s: &str) -> Result<OffsetDateTime> {
    // Try RFC3339 first (e.g., "2024-01-15T10:30:00Z")
    if let Ok(dt) = OffsetDateTime::parse(s, &time::format_description::well_known::Rfc3339) {
        return Ok(dt);
    }

    // Try YYYY-MM-DD format (treat as start of day in UTC)
    let format =
        time::format_description::parse("[year]-[month]-[day]").expect("valid format description");
    if let Ok(date) = time::Date::parse(s, &format) {
        return Ok(date.with_hms(0, 0, 0).expect("valid time").assume_utc());
    }

    bail!(
        "Invalid date format '{}'. Use RFC3339 (e.g., 2024-01-15T10:30:00Z) or YYYY-MM-DD",
        s
    )
}

/// Resolve an optional from/to pair into an inclusive instant range.
///
/// A missing lower bound opens the range at the Unix epoch; a missing upper
/// bound closes it at the current instant. A date-only upper bound is pushed
/// to the end of its day so `--to 2024-01-15` includes that whole day.
pub fn resolve_range(from: Option<&str>, to: Option<&str>) -> Result<(OffsetDateTime, OffsetDateTime)> {
    let start = match from {
        Some(s) => parse_datetime(s)?,
        None => OffsetDateTime::UNIX_EPOCH,
    };
    let end = match to {
        Some(s) => {
            let parsed = parse_datetime(s)?;
            if s.len() == 10 { end_of_day(parsed) } else { parsed }
        }
        None => OffsetDateTime::now_utc(),
    };
    if end < start {
        bail!("--to must not be earlier than --from");
    }
    Ok((start, end))
}

/// Last second of the calendar day containing `t`, in UTC.
fn end_of_day(t: OffsetDateTime) -> OffsetDateTime {
    t.date().with_hms(23, 59, 59).expect("valid time").assume_utc()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_datetime("2024-01-15T10:30:00Z").unwrap();
        assert_eq!(dt.unix_timestamp(), 1_705_314_600);
    }

    #[test]
    fn test_parse_date_only_is_start_of_day_utc() {
        let dt = parse_datetime("2024-01-15").unwrap();
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (0, 0, 0));
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_datetime("15/01/2024").is_err());
    }

    #[test]
    fn test_range_date_only_upper_bound_covers_whole_day() {
        let (start, end) = resolve_range(Some("2024-01-15"), Some("2024-01-15")).unwrap();
        assert_eq!(end.unix_timestamp() - start.unix_timestamp(), 86_399);
    }

    #[test]
    fn test_range_rejects_inverted_bounds() {
        assert!(resolve_range(Some("2024-01-16"), Some("2024-01-15")).is_err());
    }
}
