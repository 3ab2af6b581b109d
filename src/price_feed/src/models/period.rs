//! Lookback period, spelled the way Yahoo Finance spells it (`max`, `5y`, `6mo`, `60d`, `ytd`).

use std::{fmt, num::NonZeroU32, str::FromStr};

use chrono::{DateTime, Datelike, Months, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ParamError;

/// How far back from the request's `as_of` instant to load history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    /// Entire available history.
    #[default]
    Max,
    Days(NonZeroU32),
    Weeks(NonZeroU32),
    Months(NonZeroU32),
    Years(NonZeroU32),
    /// From January 1st of the `as_of` year.
    YearToDate,
}

impl Period {
    /// Inclusive UTC start of the period ending at `as_of`, or `None` for [`Period::Max`].
    ///
    /// A lookback reaching past the representable date range is also `None`,
    /// which loads all history.
    pub fn start(&self, as_of: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match *self {
            Period::Max => None,
            Period::Days(n) => TimeDelta::try_days(i64::from(n.get()))
                .and_then(|lookback| as_of.checked_sub_signed(lookback)),
            Period::Weeks(n) => TimeDelta::try_weeks(i64::from(n.get()))
                .and_then(|lookback| as_of.checked_sub_signed(lookback)),
            Period::Months(n) => as_of.checked_sub_months(Months::new(n.get())),
            Period::Years(n) => n
                .get()
                .checked_mul(12)
                .and_then(|months| as_of.checked_sub_months(Months::new(months))),
            Period::YearToDate => Utc
                .with_ymd_and_hms(as_of.year(), 1, 1, 0, 0, 0)
                .single(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Max => f.write_str("max"),
            Period::YearToDate => f.write_str("ytd"),
            Period::Days(n) => write!(f, "{n}d"),
            Period::Weeks(n) => write!(f, "{n}wk"),
            Period::Months(n) => write!(f, "{n}mo"),
            Period::Years(n) => write!(f, "{n}y"),
        }
    }
}

impl FromStr for Period {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |message: &str| ParamError::InvalidPeriod {
            input: s.to_string(),
            message: message.to_string(),
        };

        let norm = s.trim().to_lowercase();
        match norm.as_str() {
            "max" => return Ok(Period::Max),
            "ytd" => return Ok(Period::YearToDate),
            "" => return Err(invalid("empty period")),
            _ => {}
        }

        let split = norm
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| invalid("missing unit (d, wk, mo, y)"))?;
        let (digits, unit) = norm.split_at(split);
        let amount: u32 = digits
            .parse()
            .map_err(|_| invalid("amount must be a positive integer"))?;
        let amount = NonZeroU32::new(amount).ok_or_else(|| invalid("amount must be > 0"))?;

        match unit {
            "d" => Ok(Period::Days(amount)),
            "wk" => Ok(Period::Weeks(amount)),
            "mo" => Ok(Period::Months(amount)),
            "y" => Ok(Period::Years(amount)),
            _ => Err(invalid("unknown unit, expected d, wk, mo or y")),
        }
    }
}
