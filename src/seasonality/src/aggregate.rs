//! Group-by-calendar-key summaries of a return series.
//!
//! Month, ISO week and weekday profiles are a single group-by. The
//! day-of-month profile is two-stage: statistics are computed per
//! `(day, month)` pair and then averaged across the months sharing a day, so
//! each month's day-N weighs the same regardless of how many years it has.
//! This differs from pooling all day-N observations and is kept that way on
//! purpose.

use std::collections::BTreeMap;

use serde::Serialize;
use statrs::statistics::Statistics;
use tracing::debug;

use crate::{
    calendar::{CalendarKey, Granularity},
    series::TimeSeries,
};

/// Summary of one calendar bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BucketStats {
    /// Arithmetic mean of the bucket's returns.
    pub mean: f64,
    /// Sample (N-1) standard deviation. NaN for a single observation.
    pub std_dev: f64,
    /// Fraction of returns strictly above zero, in `[0, 1]`.
    pub prob_positive: f64,
    /// Defined returns that went into the bucket.
    pub observations: usize,
}

impl BucketStats {
    /// Summarizes `values`, ignoring NaN. `None` when nothing is defined.
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let defined: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
        if defined.is_empty() {
            return None;
        }
        let positive = defined.iter().filter(|&&v| v > 0.0).count();

        Some(Self {
            mean: defined.iter().mean(),
            std_dev: defined.iter().std_dev(),
            prob_positive: positive as f64 / defined.len() as f64,
            observations: defined.len(),
        })
    }
}

/// Calendar key → bucket statistics, ordered by key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalProfile {
    granularity: Granularity,
    buckets: BTreeMap<CalendarKey, BucketStats>,
}

impl SeasonalProfile {
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn get(&self, key: CalendarKey) -> Option<&BucketStats> {
        self.buckets.get(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CalendarKey, &BucketStats)> + '_ {
        self.buckets.iter().map(|(k, v)| (*k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = CalendarKey> + '_ {
        self.buckets.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total defined observations across buckets.
    pub fn observations(&self) -> usize {
        self.buckets.values().map(|b| b.observations).sum()
    }
}

/// Builds the seasonal profile of `returns` under `granularity`.
///
/// Keys with no defined observation are omitted; an empty series gives an
/// empty profile.
pub fn aggregate(returns: &TimeSeries, granularity: Granularity) -> SeasonalProfile {
    let buckets = match granularity {
        Granularity::DayOfMonth => day_of_month_buckets(returns),
        _ => single_stage_buckets(returns, granularity),
    };
    debug!(%granularity, buckets = buckets.len(), "aggregated returns");

    SeasonalProfile {
        granularity,
        buckets,
    }
}

fn single_stage_buckets(
    returns: &TimeSeries,
    granularity: Granularity,
) -> BTreeMap<CalendarKey, BucketStats> {
    let mut groups: BTreeMap<CalendarKey, Vec<f64>> = BTreeMap::new();
    for (date, value) in returns.iter() {
        groups.entry(granularity.key(date)).or_default().push(value);
    }
    groups
        .into_iter()
        .filter_map(|(key, values)| BucketStats::from_values(values).map(|s| (key, s)))
        .collect()
}

fn day_of_month_buckets(returns: &TimeSeries) -> BTreeMap<CalendarKey, BucketStats> {
    // (day, month) ordering keeps every day's months adjacent
    let mut pairs: BTreeMap<(CalendarKey, CalendarKey), Vec<f64>> = BTreeMap::new();
    for (date, value) in returns.iter() {
        let day = Granularity::DayOfMonth.key(date);
        let month = Granularity::Monthly.key(date);
        pairs.entry((day, month)).or_default().push(value);
    }

    let mut per_day: BTreeMap<CalendarKey, Vec<BucketStats>> = BTreeMap::new();
    for ((day, _month), values) in pairs {
        if let Some(stats) = BucketStats::from_values(values) {
            per_day.entry(day).or_default().push(stats);
        }
    }

    per_day
        .into_iter()
        .map(|(day, months)| {
            let defined_std: Vec<f64> = months
                .iter()
                .map(|s| s.std_dev)
                .filter(|v| !v.is_nan())
                .collect();
            let std_dev = if defined_std.is_empty() {
                f64::NAN
            } else {
                defined_std.iter().mean()
            };
            let stats = BucketStats {
                mean: months.iter().map(|s| s.mean).mean(),
                std_dev,
                prob_positive: months.iter().map(|s| s.prob_positive).mean(),
                observations: months.iter().map(|s| s.observations).sum(),
            };
            (day, stats)
        })
        .collect()
}
