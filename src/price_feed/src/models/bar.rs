//! Canonical in-memory representation of a daily-or-coarser price bar.
//!
//! This is the standard output of every [`DataProvider`](crate::providers::DataProvider)
//! implementation, regardless of vendor.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::models::interval::Interval;

/// A single bar, dated by its session date in the exchange's time zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    /// Session date of the bar (exchange-local calendar).
    pub date: NaiveDate,

    /// Closing price.
    pub close: f64,

    /// Close adjusted for splits and dividends. Not all providers supply this.
    pub adj_close: Option<f64>,

    /// Volume traded during the bar interval. Not all providers supply this.
    pub volume: Option<f64>,
}

impl Bar {
    /// The price seasonality is computed from: adjusted close when available.
    pub fn price(&self) -> f64 {
        self.adj_close.unwrap_or(self.close)
    }
}

/// Price history for a single symbol.
///
/// Bars are ordered by date with no duplicate dates; [`PriceSeries::new`]
/// enforces this so providers can hand over vendor data as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    /// The symbol this data represents (e.g. "AAPL", "^GSPC").
    pub symbol: String,
    /// Spacing of the bars.
    pub interval: Interval,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Builds a series, sorting bars by date and keeping the last bar seen for
    /// any repeated date (vendors occasionally repeat the live bar).
    pub fn new(symbol: impl Into<String>, interval: Interval, mut bars: Vec<Bar>) -> Self {
        let symbol = symbol.into();
        // stable sort: among equal dates, input order is preserved
        bars.sort_by_key(|b| b.date);

        let before = bars.len();
        let mut deduped: Vec<Bar> = Vec::with_capacity(before);
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }
        if deduped.len() != before {
            debug!(
                symbol = %symbol,
                dropped = before - deduped.len(),
                "collapsed bars with duplicate session dates"
            );
        }

        Self {
            symbol,
            interval,
            bars: deduped,
        }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    /// Drops bars dated before `start`.
    pub fn since(mut self, start: NaiveDate) -> Self {
        self.bars.retain(|b| b.date >= start);
        self
    }

    /// Drops bars dated after `end`.
    pub fn until(mut self, end: NaiveDate) -> Self {
        self.bars.retain(|b| b.date <= end);
        self
    }

    /// Downsamples to a coarser interval by keeping the last bar of each
    /// ISO week or calendar month.
    ///
    /// Volumes are summed over the bucket. Asking for a finer interval than
    /// the series has is a no-op.
    pub fn resample(self, target: Interval) -> Self {
        let bucket = |d: NaiveDate| -> (i32, u32) {
            match target {
                Interval::Daily => (d.num_days_from_ce(), 0),
                Interval::Weekly => {
                    let w = d.iso_week();
                    (w.year(), w.week())
                }
                Interval::Monthly => (d.year(), d.month()),
            }
        };
        if !target.is_coarser_than(self.interval) {
            return self;
        }

        let mut out: Vec<Bar> = Vec::new();
        let mut current: Option<(i32, u32)> = None;
        for bar in self.bars {
            let key = bucket(bar.date);
            match out.last_mut() {
                Some(last) if current == Some(key) => {
                    let volume = match (last.volume, bar.volume) {
                        (Some(a), Some(b)) => Some(a + b),
                        (a, b) => a.or(b),
                    };
                    *last = Bar { volume, ..bar };
                }
                _ => {
                    current = Some(key);
                    out.push(bar);
                }
            }
        }

        Self {
            symbol: self.symbol,
            interval: target,
            bars: out,
        }
    }
}
