//! Calendar helpers for the simulation clock.
//!
//! The simulation owns its own date and derives season and weekday from it, so runs do not
//! depend on the wall clock.
use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use strum::Display;

/// One of the four seasons used for donation and demand adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Season {
    /// December to February
    Winter,
    /// March to May
    Spring,
    /// June to August
    Summer,
    /// September to November
    Fall,
}

impl Season {
    /// The season the given date falls in
    pub fn from_date(date: NaiveDate) -> Self {
        match date.month() {
            12 | 1 | 2 => Self::Winter,
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            _ => Self::Fall,
        }
    }
}

/// Whether the given date falls on a weekend
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(2025, 1, 15, Season::Winter)]
    #[case(2025, 12, 1, Season::Winter)]
    #[case(2025, 4, 10, Season::Spring)]
    #[case(2025, 7, 4, Season::Summer)]
    #[case(2025, 10, 31, Season::Fall)]
    fn test_season_from_date(
        #[case] year: i32,
        #[case] month: u32,
        #[case] day: u32,
        #[case] expected: Season,
    ) {
        let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        assert_eq!(Season::from_date(date), expected);
    }

    #[test]
    fn test_is_weekend() {
        // 2025-06-02 is a Monday
        let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        assert!(!is_weekend(monday));
        assert!(is_weekend(monday + chrono::Days::new(5)));
        assert!(is_weekend(monday + chrono::Days::new(6)));
    }
}
