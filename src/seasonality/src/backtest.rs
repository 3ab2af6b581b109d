//! Naive single-bucket backtest.
//!
//! "Buy" every period whose calendar key equals the chosen key and add up its
//! return. This ignores trading costs, slippage, position sizing and
//! compounding: the curve is an illustration of the seasonal effect, not an
//! equity curve.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::{
    calendar::{CalendarKey, Granularity},
    error::SeasonalityError,
    series::TimeSeries,
};

/// Running non-compounded sum of returns for one calendar key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestCurve {
    pub granularity: Granularity,
    pub key: CalendarKey,
    points: Vec<(NaiveDate, f64)>,
}

impl BacktestCurve {
    pub fn points(&self) -> &[(NaiveDate, f64)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Last defined cumulative value.
    pub fn final_value(&self) -> Option<f64> {
        self.points.iter().rev().map(|p| p.1).find(|v| !v.is_nan())
    }
}

/// Filters `returns` to rows keyed `key` and accumulates them in date order.
///
/// Day-of-month filtering is flat (every month's day `key`). An undefined
/// return keeps its date with an undefined cumulative value and leaves the
/// running total untouched.
///
/// # Errors
///
/// [`SeasonalityError::InvalidBacktestKey`] when `key` is outside the
/// granularity's range. An in-range key with no rows yields an empty curve.
pub fn backtest(
    returns: &TimeSeries,
    granularity: Granularity,
    key: CalendarKey,
) -> Result<BacktestCurve, SeasonalityError> {
    let key = granularity.check_key(key)?;

    let mut total = 0.0;
    let points: Vec<(NaiveDate, f64)> = returns
        .iter()
        .filter(|&(date, _)| granularity.key(date) == key)
        .map(|(date, r)| {
            if r.is_nan() {
                (date, f64::NAN)
            } else {
                total += r;
                (date, total)
            }
        })
        .collect();
    debug!(%granularity, key, matched = points.len(), "backtest filtered");

    Ok(BacktestCurve {
        granularity,
        key,
        points,
    })
}
