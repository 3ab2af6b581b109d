#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Datelike, Months, NaiveDate};
use price_feed::{
    models::{
        bar::{Bar, PriceSeries},
        request_params::PriceRequest,
    },
    providers::{DataProvider, DataUnavailableSnafu, ProviderError, ProviderId},
};

/// Serves a fixed list of closes, ignoring the requested period.
pub struct StubProvider {
    pub bars: Vec<(NaiveDate, f64)>,
}

#[async_trait]
impl DataProvider for StubProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Csv
    }

    async fn fetch_prices(&self, req: &PriceRequest) -> Result<PriceSeries, ProviderError> {
        if self.bars.is_empty() {
            return DataUnavailableSnafu {
                symbol: req.symbol.as_str(),
                reason: "stub has no bars",
            }
            .fail();
        }
        let bars = self
            .bars
            .iter()
            .map(|&(date, close)| Bar {
                date,
                close,
                adj_close: None,
                volume: None,
            })
            .collect();
        Ok(PriceSeries::new(req.symbol.clone(), req.interval, bars))
    }
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Month-end closes where every January gains `jan` and every other month
/// loses `rest`.
pub fn january_effect(years: u32, jan: f64, rest: f64) -> Vec<(NaiveDate, f64)> {
    let mut price = 100.0;
    let start = d(2009, 12, 1);
    let mut out = vec![(last_day(start), price)];
    for i in 1..=years * 12 {
        let month = start + Months::new(i);
        price *= if month.month() == 1 { 1.0 + jan } else { 1.0 - rest };
        out.push((last_day(month), price));
    }
    out
}

fn last_day(first: NaiveDate) -> NaiveDate {
    (first + Months::new(1)).pred_opt().unwrap()
}
