//! One analysis run: fetch, transform, aggregate and optionally backtest.
//!
//! Nothing here holds state between runs. Each stage takes the previous
//! stage's output as an argument.

use chrono::{DateTime, Utc};
use price_feed::{
    models::{period::Period, request_params::PriceRequest},
    providers::{DataProvider, ProviderId},
};
use tracing::info;

use crate::{
    aggregate::aggregate,
    backtest::backtest,
    calendar::{CalendarKey, Granularity},
    error::SeasonalityError,
    report::SeasonalityReport,
    returns::pct_change,
    series::TimeSeries,
};

/// Inputs of one run.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub symbol: String,
    pub granularity: Granularity,
    pub period: Period,
    pub backtest_key: Option<CalendarKey>,
    /// End of the history and the date that picks the "current" bucket.
    pub as_of: DateTime<Utc>,
}

impl AnalysisRequest {
    pub fn new(symbol: impl Into<String>, granularity: Granularity, period: Period) -> Self {
        Self {
            symbol: symbol.into(),
            granularity,
            period,
            backtest_key: None,
            as_of: Utc::now(),
        }
    }

    pub fn with_backtest(mut self, key: Option<CalendarKey>) -> Self {
        self.backtest_key = key;
        self
    }

    pub fn as_of(mut self, as_of: DateTime<Utc>) -> Self {
        self.as_of = as_of;
        self
    }

    fn price_request(&self) -> PriceRequest {
        PriceRequest::new(
            self.symbol.clone(),
            self.granularity.interval(),
            self.period,
        )
        .as_of(self.as_of)
    }
}

/// Fetches prices from `provider` and builds the report.
///
/// The backtest key is checked before the provider is called.
pub async fn analyze(
    provider: &dyn DataProvider,
    request: &AnalysisRequest,
) -> Result<SeasonalityReport, SeasonalityError> {
    if let Some(key) = request.backtest_key {
        request.granularity.check_key(key)?;
    }

    let price_request = request.price_request();
    let prices = provider
        .fetch_prices(&price_request)
        .await
        .map_err(|err| SeasonalityError::from_provider(&request.symbol, err))?;
    info!(
        symbol = %request.symbol,
        provider = %provider.id(),
        bars = prices.len(),
        "prices loaded"
    );
    if prices.is_empty() {
        return Err(SeasonalityError::DataUnavailable {
            symbol: request.symbol.clone(),
            reason: "provider returned no bars".to_string(),
        });
    }

    build_report(provider.id(), request, &TimeSeries::from(&prices))
}

/// The pure part of [`analyze`], over an already loaded price series.
pub fn build_report(
    provider: ProviderId,
    request: &AnalysisRequest,
    prices: &TimeSeries,
) -> Result<SeasonalityReport, SeasonalityError> {
    let granularity = request.granularity;
    let returns = pct_change(prices);
    let profile = aggregate(&returns, granularity);
    let backtest = request
        .backtest_key
        .map(|key| backtest(&returns, granularity, key))
        .transpose()?;

    info!(
        symbol = %request.symbol,
        %granularity,
        buckets = profile.len(),
        returns = returns.defined_count(),
        "seasonality computed"
    );
    if let Some(curve) = &backtest {
        info!(key = curve.key, periods = curve.len(), "backtest computed");
    }

    Ok(SeasonalityReport {
        symbol: request.symbol.clone(),
        provider,
        interval: granularity.interval(),
        granularity,
        data_since: prices.first_date(),
        observations: returns.defined_count(),
        current_key: granularity.key(request.as_of.date_naive()),
        profile,
        backtest,
    })
}
