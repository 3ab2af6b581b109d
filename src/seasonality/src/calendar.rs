//! Calendar keys and the granularities that derive them.
//!
//! | granularity  | key               | range |
//! |--------------|-------------------|-------|
//! | `Monthly`    | month of year     | 1–12  |
//! | `Weekly`     | ISO week of year  | 1–53  |
//! | `Weekday`    | weekday, Monday=0 | 0–6   |
//! | `DayOfMonth` | day of month      | 1–31  |

use std::{fmt, ops::RangeInclusive, str::FromStr};

use chrono::{Datelike, NaiveDate};
use price_feed::models::interval::Interval;
use serde::{Deserialize, Serialize};

use crate::error::SeasonalityError;

/// Integer label of a calendar bucket.
pub type CalendarKey = u32;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// How daily returns are bucketed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DailyMode {
    #[default]
    ByWeekday,
    ByDayOfMonth,
}

impl FromStr for DailyMode {
    type Err = SeasonalityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "by-weekday" | "weekday" | "wd" => Ok(DailyMode::ByWeekday),
            "by-day-of-month" | "day-of-month" | "m" => Ok(DailyMode::ByDayOfMonth),
            other => Err(SeasonalityError::InvalidGranularityConfiguration(format!(
                "unknown daily sub-mode {other:?}, expected by-weekday or by-day-of-month"
            ))),
        }
    }
}

/// The closed set of seasonal bucketings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Monthly,
    Weekly,
    Weekday,
    /// Day of month, aggregated per (day, month) first and then across months.
    DayOfMonth,
}

impl Granularity {
    /// Maps the command-surface pair to a granularity.
    ///
    /// The sub-mode must be recognizable even when `interval` makes it
    /// irrelevant (monthly, weekly).
    pub fn resolve(interval: &str, daily_mode: &str) -> Result<Self, SeasonalityError> {
        let interval: Interval = interval
            .parse()
            .map_err(|e| SeasonalityError::InvalidGranularityConfiguration(format!("{e}")))?;
        let mode: DailyMode = daily_mode.parse()?;
        Ok(Self::for_interval(interval, mode))
    }

    pub fn for_interval(interval: Interval, mode: DailyMode) -> Self {
        match (interval, mode) {
            (Interval::Monthly, _) => Granularity::Monthly,
            (Interval::Weekly, _) => Granularity::Weekly,
            (Interval::Daily, DailyMode::ByWeekday) => Granularity::Weekday,
            (Interval::Daily, DailyMode::ByDayOfMonth) => Granularity::DayOfMonth,
        }
    }

    /// Bar spacing the analysis needs from the provider.
    pub fn interval(&self) -> Interval {
        match self {
            Granularity::Monthly => Interval::Monthly,
            Granularity::Weekly => Interval::Weekly,
            Granularity::Weekday | Granularity::DayOfMonth => Interval::Daily,
        }
    }

    pub fn key(&self, date: NaiveDate) -> CalendarKey {
        match self {
            Granularity::Monthly => date.month(),
            Granularity::Weekly => date.iso_week().week(),
            Granularity::Weekday => date.weekday().num_days_from_monday(),
            Granularity::DayOfMonth => date.day(),
        }
    }

    pub fn key_range(&self) -> RangeInclusive<CalendarKey> {
        match self {
            Granularity::Monthly => 1..=12,
            Granularity::Weekly => 1..=53,
            Granularity::Weekday => 0..=6,
            Granularity::DayOfMonth => 1..=31,
        }
    }

    /// Rejects keys no date can produce under this granularity.
    pub fn check_key(&self, key: CalendarKey) -> Result<CalendarKey, SeasonalityError> {
        if self.key_range().contains(&key) {
            Ok(key)
        } else {
            Err(SeasonalityError::InvalidBacktestKey {
                key,
                granularity: *self,
            })
        }
    }

    /// Short human label: `Jan`, `W07`, `Mon`, `15`.
    pub fn key_label(&self, key: CalendarKey) -> String {
        let named = |names: &[&str], idx: Option<u32>| {
            idx.and_then(|i| names.get(i as usize))
                .map_or_else(|| key.to_string(), |s| s.to_string())
        };
        match self {
            Granularity::Monthly => named(&MONTHS, key.checked_sub(1)),
            Granularity::Weekly => format!("W{key:02}"),
            Granularity::Weekday => named(&WEEKDAYS, Some(key)),
            Granularity::DayOfMonth => key.to_string(),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Granularity::Monthly => "month-of-year",
            Granularity::Weekly => "week-of-year",
            Granularity::Weekday => "weekday",
            Granularity::DayOfMonth => "day-of-month",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn resolve_maps_interval_and_sub_mode() {
        assert_eq!(
            Granularity::resolve("monthly", "by-day-of-month").unwrap(),
            Granularity::Monthly
        );
        assert_eq!(
            Granularity::resolve("1wk", "by-weekday").unwrap(),
            Granularity::Weekly
        );
        assert_eq!(
            Granularity::resolve("daily", "by-weekday").unwrap(),
            Granularity::Weekday
        );
        assert_eq!(
            Granularity::resolve("1d", "m").unwrap(),
            Granularity::DayOfMonth
        );
    }

    #[test]
    fn resolve_rejects_unknown_strings() {
        let err = Granularity::resolve("hourly", "by-weekday").unwrap_err();
        assert!(matches!(
            err,
            SeasonalityError::InvalidGranularityConfiguration(_)
        ));
        let err = Granularity::resolve("daily", "by-quarter").unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("by-quarter"));
    }

    #[test]
    fn keys_follow_calendar_conventions() {
        // 2021-01-01 is a Friday in ISO week 53 of 2020
        let date = d(2021, 1, 1);
        assert_eq!(Granularity::Monthly.key(date), 1);
        assert_eq!(Granularity::Weekly.key(date), 53);
        assert_eq!(Granularity::Weekday.key(date), 4);
        assert_eq!(Granularity::DayOfMonth.key(date), 1);

        assert_eq!(Granularity::Weekday.key(d(2024, 6, 3)), 0);
        assert_eq!(Granularity::Weekday.key(d(2024, 6, 9)), 6);
    }

    #[test]
    fn check_key_uses_granularity_range() {
        assert!(Granularity::Weekday.check_key(0).is_ok());
        assert!(Granularity::Weekday.check_key(7).is_err());
        assert!(Granularity::Monthly.check_key(0).is_err());
        assert!(Granularity::Weekly.check_key(53).is_ok());
        let err = Granularity::DayOfMonth.check_key(32).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Backtest key 32 is outside the day-of-month range 1..=31"
        );
    }

    #[test]
    fn labels() {
        assert_eq!(Granularity::Monthly.key_label(1), "Jan");
        assert_eq!(Granularity::Monthly.key_label(12), "Dec");
        assert_eq!(Granularity::Weekly.key_label(7), "W07");
        assert_eq!(Granularity::Weekday.key_label(6), "Sun");
        assert_eq!(Granularity::DayOfMonth.key_label(15), "15");
        // out of range falls back to the number
        assert_eq!(Granularity::Monthly.key_label(0), "0");
    }
}
