//! Calendar helpers: birth-date parsing and age computation.

use chrono::{DateTime, Datelike, NaiveDate};

/// Accepted textual date layouts, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y"];

/// Parse a date written in one of the accepted layouts.
///
/// RFC 3339 timestamps are accepted and truncated to their date part.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Whole calendar years between `birth` and `today`.
///
/// Returns `None` when `birth` lies after `today`.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> Option<u32> {
    if birth > today {
        return None;
    }

    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test_case("1990-01-15" ; "iso")]
    #[test_case("1990/01/15" ; "slashes")]
    #[test_case("15-01-1990" ; "day first dashes")]
    #[test_case("15/01/1990" ; "day first slashes")]
    #[test_case("1990-01-15T08:30:00Z" ; "rfc3339")]
    fn test_parse_date_layouts(input: &str) {
        assert_eq!(parse_date(input), Some(date(1990, 1, 15)));
    }

    #[test_case("" ; "empty")]
    #[test_case("yesterday" ; "words")]
    #[test_case("1990-13-01" ; "bad month")]
    #[test_case("1990-02-30" ; "bad day")]
    fn test_parse_date_rejects(input: &str) {
        assert_eq!(parse_date(input), None);
    }

    #[test]
    fn test_age_counts_completed_years() {
        let today = date(2024, 6, 15);
        assert_eq!(age_on(date(2006, 6, 15), today), Some(18));
        assert_eq!(age_on(date(2006, 6, 16), today), Some(17));
        assert_eq!(age_on(date(2024, 6, 15), today), Some(0));
    }

    #[test]
    fn test_age_handles_leap_day_birthdays() {
        let birth = date(2004, 2, 29);
        assert_eq!(age_on(birth, date(2022, 2, 28)), Some(17));
        assert_eq!(age_on(birth, date(2022, 3, 1)), Some(18));
    }

    #[test]
    fn test_age_of_future_birth_is_none() {
        assert_eq!(age_on(date(2030, 1, 1), date(2024, 1, 1)), None);
    }

    proptest! {
        #[test]
        fn test_age_never_decreases(offset in 0i64..20_000, extra in 0i64..2_000) {
            let birth = date(1950, 1, 1);
            let earlier = birth + chrono::Duration::days(offset);
            let later = earlier + chrono::Duration::days(extra);
            prop_assert!(age_on(birth, later) >= age_on(birth, earlier));
        }
    }
}
