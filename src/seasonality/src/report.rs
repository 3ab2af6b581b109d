use chrono::NaiveDate;
use price_feed::{models::interval::Interval, providers::ProviderId};
use serde::Serialize;

use crate::{
    aggregate::SeasonalProfile,
    backtest::BacktestCurve,
    calendar::{CalendarKey, Granularity},
};

/// Everything a [`ReportSink`](crate::sink::ReportSink) renders for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalityReport {
    pub symbol: String,
    pub provider: ProviderId,
    pub interval: Interval,
    pub granularity: Granularity,
    /// First session date of the price history.
    pub data_since: Option<NaiveDate>,
    /// Defined returns in the analysed window.
    pub observations: usize,
    /// Bucket containing the run's reference date.
    pub current_key: CalendarKey,
    pub profile: SeasonalProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backtest: Option<BacktestCurve>,
}
