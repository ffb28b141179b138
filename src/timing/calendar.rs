//! Weekend and business-day arithmetic over calendar dates.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::{FilingError, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Walks forward one day at a time, counting only days `is_holiday` rejects,
/// until `days` business days have passed.
pub fn add_business_days(
    start: NaiveDate,
    days: u32,
    is_holiday: impl Fn(NaiveDate) -> bool,
) -> Result<NaiveDate> {
    let mut current = start;
    let mut remaining = days;
    while remaining > 0 {
        current = current.checked_add_days(Days::new(1)).ok_or_else(|| FilingError::DomainRule(format!("date overflow adding {} business days to {}", days, start)))?;
        if !is_holiday(current) {
            remaining -= 1;
        }
    }
    Ok(current)
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| FilingError::Convert(format!("invalid date '{}': {}", s, e)))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_friday_plus_one_is_monday() {
        let friday = date("2026-01-09");
        assert_eq!(add_business_days(friday, 1, is_weekend).unwrap(), date("2026-01-12"));
    }

    #[test]
    fn test_holidays_are_skipped() {
        let holiday = date("2026-01-12");
        let next = add_business_days(date("2026-01-09"), 2, |d| is_weekend(d) || d == holiday).unwrap();
        assert_eq!(next, date("2026-01-14"));
    }

    #[test]
    fn test_zero_days() {
        let saturday = date("2026-01-10");
        assert!(is_weekend(saturday));
        assert_eq!(add_business_days(saturday, 0, is_weekend).unwrap(), saturday);
    }

    #[test]
    fn test_parse_and_format() {
        assert_eq!(format_date(date("2026-03-01")), "2026-03-01");
        assert!(matches!(parse_date("01/03/2026"), Err(FilingError::Convert(_))));
    }
}
