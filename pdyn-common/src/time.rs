//! Timestamp utilities
//!
//! Snapshot timestamps arrive as text from the sync job. Every timestamp is
//! mapped into one reporting timezone (a fixed UTC offset) before its
//! calendar date is taken.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use serde::Serialize;

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Fixed UTC offset from minutes east of UTC
///
/// Returns `None` outside the +/- 24h range chrono accepts.
pub fn reporting_offset(minutes_east: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(minutes_east.checked_mul(60)?)
}

/// Parse a stored timestamp into the reporting timezone.
///
/// Accepted forms:
/// - RFC 3339 (`2025-01-15T09:30:00Z`, `2025-01-15T09:30:00.123+03:00`)
/// - SQL style with offset (`2025-01-15 09:30:00+00`)
/// - naive date-time (`2025-01-15T09:30:00`, `2025-01-15 09:30:00`), read as reporting-local
/// - bare date (`2025-01-15`), read as reporting-local midnight
pub fn parse_timestamp(raw: &str, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&offset));
    }
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(ts.with_timezone(&offset));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return offset.from_local_datetime(&naive).single();
        }
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    offset
        .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
        .single()
}

/// Calendar date of a stored timestamp in the reporting timezone
pub fn reporting_date(raw: &str, offset: FixedOffset) -> Option<NaiveDate> {
    parse_timestamp(raw, offset).map(|ts| ts.date_naive())
}

/// Table column label, `DD.MM.YYYY`
pub fn format_day_label(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// Run of consecutive axis dates sharing a calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthSpan {
    /// `YYYY-MM`
    pub month: String,
    /// Number of axis dates in this month
    pub dates: usize,
}

/// Group an ascending date axis into month header spans
pub fn month_spans(dates: &[NaiveDate]) -> Vec<MonthSpan> {
    let mut spans: Vec<MonthSpan> = Vec::new();
    let mut current: Option<(i32, u32)> = None;

    for date in dates {
        let key = (date.year(), date.month());
        match spans.last_mut() {
            Some(span) if current == Some(key) => span.dates += 1,
            _ => {
                spans.push(MonthSpan {
                    month: format!("{:04}-{:02}", key.0, key.1),
                    dates: 1,
                });
                current = Some(key);
            }
        }
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn utc() -> FixedOffset {
        reporting_offset(0).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_reporting_offset_bounds() {
        assert!(reporting_offset(180).is_some());
        assert!(reporting_offset(-300).is_some());
        assert!(reporting_offset(24 * 60).is_none());
        assert!(reporting_offset(i32::MAX).is_none());
    }

    #[test]
    fn test_parse_rfc3339() {
        let ts = parse_timestamp("2025-01-15T09:30:00Z", utc()).unwrap();
        assert_eq!(ts.date_naive(), day(2025, 1, 15));
        assert_eq!(ts.hour(), 9);
    }

    #[test]
    fn test_parse_sql_style_with_offset() {
        let ts = parse_timestamp("2025-01-15 09:30:00.123456+00", utc()).unwrap();
        assert_eq!(ts.date_naive(), day(2025, 1, 15));
    }

    #[test]
    fn test_parse_naive_and_bare_date() {
        assert_eq!(reporting_date("2025-01-15T23:59:59", utc()), Some(day(2025, 1, 15)));
        assert_eq!(reporting_date("2025-01-15 00:00:01", utc()), Some(day(2025, 1, 15)));
        assert_eq!(reporting_date("2025-01-15", utc()), Some(day(2025, 1, 15)));
    }

    #[test]
    fn test_offset_moves_calendar_date() {
        let moscow = reporting_offset(180).unwrap();
        assert_eq!(
            reporting_date("2025-01-15T22:30:00Z", moscow),
            Some(day(2025, 1, 16))
        );
        let new_york = reporting_offset(-300).unwrap();
        assert_eq!(
            reporting_date("2025-01-15T02:00:00Z", new_york),
            Some(day(2025, 1, 14))
        );
    }

    #[test]
    fn test_naive_timestamp_is_reporting_local() {
        let moscow = reporting_offset(180).unwrap();
        assert_eq!(
            reporting_date("2025-01-15T23:00:00", moscow),
            Some(day(2025, 1, 15))
        );
    }

    #[test]
    fn test_unparseable_timestamps() {
        assert_eq!(parse_timestamp("", utc()), None);
        assert_eq!(parse_timestamp("yesterday", utc()), None);
        assert_eq!(parse_timestamp("2025-13-01", utc()), None);
        assert_eq!(parse_timestamp("15.01.2025", utc()), None);
    }

    #[test]
    fn test_format_day_label() {
        assert_eq!(format_day_label(day(2025, 4, 5)), "05.04.2025");
    }

    #[test]
    fn test_month_spans() {
        let dates = [
            day(2025, 4, 26),
            day(2025, 5, 3),
            day(2025, 5, 10),
            day(2025, 5, 31),
            day(2025, 6, 7),
        ];
        let spans = month_spans(&dates);
        assert_eq!(
            spans,
            vec![
                MonthSpan { month: "2025-04".into(), dates: 1 },
                MonthSpan { month: "2025-05".into(), dates: 3 },
                MonthSpan { month: "2025-06".into(), dates: 1 },
            ]
        );
    }

    #[test]
    fn test_month_spans_same_month_different_year() {
        let spans = month_spans(&[day(2024, 1, 1), day(2025, 1, 1)]);
        assert_eq!(spans.len(), 2);
        assert!(month_spans(&[]).is_empty());
    }
}
