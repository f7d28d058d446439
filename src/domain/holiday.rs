//! Holiday calendar used by date-driven predictions.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};

/// Public holidays of the covered calendar year (2026), in ISO form.
pub const HOLIDAYS_2026: [&str; 18] = [
    "2026-01-01",
    "2026-02-16",
    "2026-02-17",
    "2026-02-18",
    "2026-03-01",
    "2026-03-02",
    "2026-05-05",
    "2026-05-25",
    "2026-06-06",
    "2026-08-15",
    "2026-08-17",
    "2026-09-24",
    "2026-09-25",
    "2026-09-26",
    "2026-10-03",
    "2026-10-05",
    "2026-10-09",
    "2026-12-25",
];

/// Weekend rule plus a fixed table of known holiday dates.
#[derive(Debug, Clone)]
pub struct HolidayCalendar {
    dates: BTreeSet<NaiveDate>,
}

impl HolidayCalendar {
    /// Calendar holding the built-in 2026 holiday table.
    pub fn new() -> Self {
        let dates = HOLIDAYS_2026
            .iter()
            .filter_map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .collect();
        Self { dates }
    }

    /// Built-in table merged with additional configured dates.
    pub fn with_extra_dates<I>(extra: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut calendar = Self::new();
        calendar.dates.extend(extra);
        calendar
    }

    /// True for Saturdays, Sundays and every listed holiday.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun) || self.dates.contains(&date)
    }

    /// Number of listed (non-weekend) holiday dates.
    pub fn listed_count(&self) -> usize {
        self.dates.len()
    }
}

impl Default for HolidayCalendar {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[rstest]
    #[case("2026-01-01", true)] // New Year's Day, Thursday
    #[case("2026-01-03", true)] // Saturday
    #[case("2026-01-04", true)] // Sunday
    #[case("2026-01-05", false)] // plain Monday
    #[case("2026-02-17", true)] // Seollal
    #[case("2026-10-09", true)] // Hangul Day
    #[case("2026-10-19", false)]
    #[case("2027-01-01", false)] // outside the covered year, a Friday
    fn test_is_holiday(#[case] day: &str, #[case] expected: bool) {
        let calendar = HolidayCalendar::new();
        assert_eq!(calendar.is_holiday(date(day)), expected);
    }

    #[test]
    fn test_builtin_table_parses_completely() {
        assert_eq!(HolidayCalendar::new().listed_count(), HOLIDAYS_2026.len());
    }

    #[test]
    fn test_every_weekend_is_holiday() {
        let calendar = HolidayCalendar::new();
        let mut day = date("2026-01-01");
        while day.year() == 2026 {
            if matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
                assert!(calendar.is_holiday(day), "{day} should be a holiday");
            }
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_extra_dates_are_merged() {
        let calendar = HolidayCalendar::with_extra_dates([date("2026-06-03")]);
        assert!(calendar.is_holiday(date("2026-06-03")));
        assert!(calendar.is_holiday(date("2026-01-01")));
        assert_eq!(calendar.listed_count(), HOLIDAYS_2026.len() + 1);
    }
}
