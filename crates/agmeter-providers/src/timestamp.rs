use chrono::{DateTime, Utc};

/// Parse a record timestamp leniently.
///
/// Both log formats emit ISO-8601 with either nanosecond-fractional or
/// whole-second precision. An unparsable (or absent) timestamp is treated
/// as missing for that record only and never aborts the line.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}
