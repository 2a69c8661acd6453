use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Rendered in place of a timestamp the chain did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// Render a chain timestamp (milliseconds since the epoch) as RFC 3339 UTC.
pub fn format_timestamp(millis: Option<u64>) -> String {
    millis
        .and_then(|ms| OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000).ok())
        .and_then(|dt| dt.format(&Rfc3339).ok())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(Some(0)), "1970-01-01T00:00:00Z");
        assert_eq!(format_timestamp(Some(1_700_000_000_000)), "2023-11-14T22:13:20Z");
        assert_eq!(format_timestamp(Some(1_700_000_000_500)), "2023-11-14T22:13:20.5Z");
        assert_eq!(format_timestamp(None), "N/A");
    }
}
