use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use snafu::{OptionExt, ResultExt};
use tracing::{debug, info, warn};

use crate::{
    models::{
        bar::{Bar, PriceSeries},
        interval::Interval,
        request_params::PriceRequest,
    },
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, DataUnavailableSnafu, DecodeSnafu,
        ProviderError, ProviderId, ProviderInitError, ReqwestSnafu,
        yahoo::response::{ChartResponse, ChartResult},
    },
    tz::{US_EQUITY_TZ, parse_tz, session_date_from_unix},
};

const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

// The chart endpoint rejects requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub struct YahooProvider {
    client: Client,
    base_url: String,
}

impl YahooProvider {
    /// Creates a Yahoo provider whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, ProviderInitError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
        })
    }

    /// Points the provider at another chart endpoint (mirrors, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Builds the chart query: `range=max` for all history, explicit
/// `period1`/`period2` Unix bounds otherwise.
pub fn construct_query(req: &PriceRequest) -> Vec<(String, String)> {
    let mut query = vec![
        ("interval".to_string(), req.interval.as_yahoo_str().to_string()),
        ("includeAdjustedClose".to_string(), "true".to_string()),
        ("events".to_string(), "div,splits".to_string()),
    ];
    match req.start() {
        Some(start) => {
            query.push(("period1".to_string(), start.timestamp().to_string()));
            query.push(("period2".to_string(), req.as_of.timestamp().to_string()));
        }
        None => query.push(("range".to_string(), "max".to_string())),
    }
    query
}

#[async_trait]
impl DataProvider for YahooProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    async fn fetch_prices(&self, req: &PriceRequest) -> Result<PriceSeries, ProviderError> {
        let url = format!("{}/{}", self.base_url, req.symbol);
        info!(
            symbol = %req.symbol,
            interval = %req.interval,
            period = %req.period,
            "requesting Yahoo chart"
        );

        let response = self
            .client
            .get(&url)
            .query(&construct_query(req))
            .send()
            .await
            .context(ReqwestSnafu)?;

        let status = response.status();
        let body = response.text().await.context(ReqwestSnafu)?;

        // Error payloads come back as chart JSON with a non-2xx status, so the
        // body is parsed before the status is looked at.
        match parse_chart(&req.symbol, req.interval, &body) {
            Err(ProviderError::Decode { .. }) if !status.is_success() => ApiSnafu {
                message: format!("HTTP {status}"),
            }
            .fail(),
            other => other,
        }
    }
}

/// Parses a chart API body into a [`PriceSeries`].
///
/// A `Not Found` error payload or a result with no priced bars is reported
/// as [`ProviderError::DataUnavailable`]; any other error payload is an
/// [`ProviderError::Api`] error.
pub fn parse_chart(
    symbol: &str,
    interval: Interval,
    body: &str,
) -> Result<PriceSeries, ProviderError> {
    let response: ChartResponse = serde_json::from_str(body).context(DecodeSnafu)?;

    if let Some(err) = response.chart.error {
        if err.code.eq_ignore_ascii_case("not found") {
            return DataUnavailableSnafu {
                symbol,
                reason: err.description,
            }
            .fail();
        }
        return ApiSnafu {
            message: format!("{}: {}", err.code, err.description),
        }
        .fail();
    }

    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .context(DataUnavailableSnafu {
            symbol,
            reason: "empty chart result",
        })?;

    let bars = bars_from_result(&result);
    if bars.is_empty() {
        return DataUnavailableSnafu {
            symbol,
            reason: format!("no priced {interval} bars"),
        }
        .fail();
    }

    let series = PriceSeries::new(symbol, interval, bars);
    debug!(
        symbol = %symbol,
        vendor_symbol = %result.meta.symbol,
        bars = series.len(),
        "parsed Yahoo chart"
    );
    Ok(series)
}

fn bars_from_result(result: &ChartResult) -> Vec<Bar> {
    let tz = match result.meta.exchange_timezone_name.as_deref().map(parse_tz) {
        Some(Ok(tz)) => tz,
        Some(Err(err)) => {
            warn!(%err, "falling back to New York session dates");
            US_EQUITY_TZ
        }
        None => US_EQUITY_TZ,
    };

    let Some(quote) = result.indicators.quote.first() else {
        return Vec::new();
    };
    let adj = result
        .indicators
        .adjclose
        .as_ref()
        .and_then(|columns| columns.first());

    let mut bars = Vec::with_capacity(result.timestamp.len());
    let mut skipped = 0usize;
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let close = quote.close.get(i).copied().flatten();
        let adj_close = adj.and_then(|a| a.adjclose.get(i).copied().flatten());
        let volume = quote.volume.get(i).copied().flatten();

        // When the adjusted column exists every row must have it, otherwise
        // adjusted and raw prices would be mixed within one series.
        let priced = match (close, adj.is_some(), adj_close) {
            (Some(c), true, Some(a)) => Some((c, Some(a))),
            (Some(c), false, _) => Some((c, None)),
            _ => None,
        };
        let date = session_date_from_unix(ts, tz);

        match (priced, date) {
            (Some((close, adj_close)), Some(date)) => bars.push(Bar {
                date,
                close,
                adj_close,
                volume,
            }),
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!(skipped, "dropped Yahoo rows without a price");
    }
    bars
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use crate::models::period::Period;

    use super::*;

    const AAPL_MONTHLY: &str = r#"{
      "chart": {
        "result": [{
          "meta": { "symbol": "AAPL", "exchangeTimezoneName": "America/New_York" },
          "timestamp": [1704085200, 1706763600, 1709269200],
          "indicators": {
            "quote": [{ "close": [184.4, 180.75, null], "volume": [1, 2, 3] }],
            "adjclose": [{ "adjclose": [183.9, 180.3, 170.1] }]
          }
        }],
        "error": null
      }
    }"#;

    #[test]
    fn parses_adjusted_monthly_bars_on_local_dates() {
        let series = parse_chart("AAPL", Interval::Monthly, AAPL_MONTHLY).unwrap();

        // the third row has no raw close and is dropped
        assert_eq!(series.len(), 2);
        let dates: Vec<NaiveDate> = series.bars().iter().map(|b| b.date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            ]
        );
        assert_eq!(series.bars()[0].price(), 183.9);
        assert_eq!(series.bars()[1].volume, Some(2.0));
    }

    #[test]
    fn not_found_payload_is_data_unavailable() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart("NOPE", Interval::Daily, body).unwrap_err();
        assert!(err.is_data_unavailable());
        assert!(err.to_string().contains("delisted"));
    }

    #[test]
    fn other_error_payload_is_api_error() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"Invalid input - interval=7d is not supported"}}}"#;
        let err = parse_chart("AAPL", Interval::Daily, body).unwrap_err();
        assert!(matches!(err, ProviderError::Api { .. }));
    }

    #[test]
    fn result_without_timestamps_is_data_unavailable() {
        let body = r#"{"chart":{"result":[{"meta":{"symbol":"AAPL"},"indicators":{"quote":[{}]}}],"error":null}}"#;
        let err = parse_chart("AAPL", Interval::Weekly, body).unwrap_err();
        assert!(err.is_data_unavailable());
    }

    #[test]
    fn garbage_body_is_decode_error() {
        let err = parse_chart("AAPL", Interval::Daily, "<html>").unwrap_err();
        assert!(matches!(err, ProviderError::Decode { .. }));
    }

    #[test]
    fn query_uses_range_for_max_and_bounds_otherwise() {
        let as_of = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        let max = PriceRequest::new("AAPL", Interval::Monthly, Period::Max).as_of(as_of);
        let q = construct_query(&max);
        assert!(q.contains(&("range".to_string(), "max".to_string())));
        assert!(q.contains(&("interval".to_string(), "1mo".to_string())));

        let ytd = PriceRequest::new("AAPL", Interval::Daily, Period::YearToDate).as_of(as_of);
        let q = construct_query(&ytd);
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().timestamp();
        assert!(q.contains(&("period1".to_string(), start.to_string())));
        assert!(q.contains(&("period2".to_string(), as_of.timestamp().to_string())));
        assert!(!q.iter().any(|(k, _)| k == "range"));
    }

    #[test]
    fn oversized_lookback_queries_full_range() {
        let as_of = Utc.with_ymd_and_hms(2024, 3, 31, 12, 0, 0).unwrap();
        let period: Period = "100000000d".parse().unwrap();
        let q = construct_query(&PriceRequest::new("AAPL", Interval::Daily, period).as_of(as_of));
        assert!(q.contains(&("range".to_string(), "max".to_string())));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        let provider = YahooProvider::new(Duration::from_secs(2))
            .unwrap()
            .with_base_url("http://127.0.0.1:1/v8/finance/chart/");
        assert_eq!(provider.base_url, "http://127.0.0.1:1/v8/finance/chart");

        let req = PriceRequest::new("AAPL", Interval::Daily, Period::Max);
        let err = provider.fetch_prices(&req).await.unwrap_err();
        assert!(matches!(err, ProviderError::Reqwest { .. }), "{err:?}");
        assert!(!err.is_data_unavailable());
    }
}
