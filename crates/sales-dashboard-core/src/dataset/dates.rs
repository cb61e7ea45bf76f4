use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

const DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d", "%Y/%m/%d"];

/// Parse a datetime cell using the day-first convention.
///
/// `05/03/2024` is the 5th of March. ISO dates are accepted as-is. A bare date
/// becomes midnight. Anything unrecognised yields `None` rather than an error.
pub fn parse_day_first(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }

    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_day_first_slash() {
        assert_eq!(
            parse_day_first("05/03/2024"),
            Some(ymd_hms(2024, 3, 5, 0, 0, 0))
        );
    }

    #[test]
    fn test_day_first_with_time() {
        assert_eq!(
            parse_day_first("31-12-2023 14:30"),
            Some(ymd_hms(2023, 12, 31, 14, 30, 0))
        );
        assert_eq!(
            parse_day_first("01.02.2024 08:15:59"),
            Some(ymd_hms(2024, 2, 1, 8, 15, 59))
        );
    }

    #[test]
    fn test_iso_formats() {
        assert_eq!(
            parse_day_first("2024-03-05"),
            Some(ymd_hms(2024, 3, 5, 0, 0, 0))
        );
        assert_eq!(
            parse_day_first("2024-03-05T09:10:11"),
            Some(ymd_hms(2024, 3, 5, 9, 10, 11))
        );
        assert_eq!(
            parse_day_first("2024-03-05T09:10:11Z"),
            Some(ymd_hms(2024, 3, 5, 9, 10, 11))
        );
    }

    #[test]
    fn test_day_greater_than_twelve_is_not_a_month() {
        // 13 cannot be a month, so a month-first parse would have failed
        assert_eq!(
            parse_day_first("13/01/2024"),
            Some(ymd_hms(2024, 1, 13, 0, 0, 0))
        );
    }

    #[test]
    fn test_unparseable_is_none() {
        assert_eq!(parse_day_first(""), None);
        assert_eq!(parse_day_first("not a date"), None);
        assert_eq!(parse_day_first("32/01/2024"), None);
    }
}
