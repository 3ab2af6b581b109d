//! Date-indexed numeric series.

use chrono::NaiveDate;
use price_feed::models::bar::PriceSeries;
use serde::Serialize;

use crate::error::SeasonalityError;

/// An ordered sequence of `(date, value)` pairs with strictly increasing dates.
///
/// Values may be NaN ("undefined"), e.g. the first element of a return series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TimeSeries {
    points: Vec<(NaiveDate, f64)>,
}

impl TimeSeries {
    /// Validates ordering; the first repeated or backwards date is reported.
    pub fn new(points: Vec<(NaiveDate, f64)>) -> Result<Self, SeasonalityError> {
        if let Some(i) = points.windows(2).position(|w| w[1].0 <= w[0].0) {
            return Err(SeasonalityError::UnorderedTimestamps {
                index: i + 1,
                date: points[i + 1].0,
            });
        }
        Ok(Self { points })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Maps values while keeping the dates, so ordering holds by construction.
    pub(crate) fn map_values<F>(&self, mut f: F) -> Self
    where
        F: FnMut(Option<f64>, f64) -> f64,
    {
        let mut prev = None;
        let points = self
            .points
            .iter()
            .map(|&(date, value)| {
                let out = f(prev, value);
                prev = Some(value);
                (date, out)
            })
            .collect();
        Self { points }
    }

    pub fn points(&self) -> &[(NaiveDate, f64)] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.0)
    }

    /// Number of values that are not NaN.
    pub fn defined_count(&self) -> usize {
        self.points.iter().filter(|p| !p.1.is_nan()).count()
    }
}

/// Prices as seen by the analysis: adjusted close where the provider has it.
impl From<&PriceSeries> for TimeSeries {
    fn from(prices: &PriceSeries) -> Self {
        // PriceSeries keeps bars sorted and unique by date
        Self {
            points: prices.bars().iter().map(|b| (b.date, b.price())).collect(),
        }
    }
}
