//! Sampling interval of a price series.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::models::ParamError;

/// Bar spacing requested from a provider.
///
/// Only the calendar-aligned intervals that seasonality analysis needs are
/// modelled; intraday bars have no stable calendar key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interval {
    Daily,
    /// Monday-based weeks.
    Weekly,
    /// Calendar months.
    Monthly,
}

impl Interval {
    /// Yahoo chart API `interval` query value.
    pub const fn as_yahoo_str(&self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
            Interval::Monthly => "1mo",
        }
    }

    /// Alpaca `timeframe` query value.
    pub const fn as_alpaca_str(&self) -> &'static str {
        match self {
            Interval::Daily => "1Day",
            Interval::Weekly => "1Week",
            Interval::Monthly => "1Month",
        }
    }

    /// True when bars at `self` spacing are wider apart than at `other`.
    pub fn is_coarser_than(&self, other: Interval) -> bool {
        self.rank() > other.rank()
    }

    fn rank(&self) -> u8 {
        match self {
            Interval::Daily => 0,
            Interval::Weekly => 1,
            Interval::Monthly => 2,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Interval::Daily => "daily",
            Interval::Weekly => "weekly",
            Interval::Monthly => "monthly",
        };
        f.write_str(s)
    }
}

impl FromStr for Interval {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "d" | "1d" | "day" | "daily" => Ok(Interval::Daily),
            "w" | "1wk" | "week" | "weekly" => Ok(Interval::Weekly),
            "mo" | "1mo" | "month" | "monthly" => Ok(Interval::Monthly),
            _ => Err(ParamError::InvalidInterval {
                input: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_words_and_yahoo_codes() {
        assert_eq!("monthly".parse::<Interval>().unwrap(), Interval::Monthly);
        assert_eq!("1mo".parse::<Interval>().unwrap(), Interval::Monthly);
        assert_eq!(" Weekly ".parse::<Interval>().unwrap(), Interval::Weekly);
        assert_eq!("1wk".parse::<Interval>().unwrap(), Interval::Weekly);
        assert_eq!("1d".parse::<Interval>().unwrap(), Interval::Daily);
    }

    #[test]
    fn coarseness_orders_daily_weekly_monthly() {
        assert!(Interval::Monthly.is_coarser_than(Interval::Weekly));
        assert!(Interval::Weekly.is_coarser_than(Interval::Daily));
        assert!(!Interval::Daily.is_coarser_than(Interval::Daily));
    }

    #[test]
    fn rejects_intraday_and_garbage() {
        for bad in ["1m", "5m", "1h", "", "fortnightly"] {
            assert!(
                bad.parse::<Interval>().is_err(),
                "{bad:?} should not parse as an interval"
            );
        }
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for interval in [Interval::Daily, Interval::Weekly, Interval::Monthly] {
            assert_eq!(interval.to_string().parse::<Interval>().unwrap(), interval);
        }
    }

    #[test]
    fn vendor_codes() {
        assert_eq!(Interval::Weekly.as_yahoo_str(), "1wk");
        assert_eq!(Interval::Monthly.as_alpaca_str(), "1Month");
    }
}
