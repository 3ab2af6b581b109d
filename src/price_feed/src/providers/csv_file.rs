//! Offline provider reading `<SYMBOL>.csv` files from a directory.
//!
//! The expected layout is the one produced by Yahoo's "Download" button and
//! most vendor exports:
//!
//! ```text
//! Date,Open,High,Low,Close,Adj Close,Volume
//! 2024-01-02,187.15,188.44,183.89,185.64,184.94,82488700
//! ```
//!
//! Header names are matched case-insensitively with spaces treated as
//! underscores. `Date` and `Close` are required; `Adj Close` is preferred
//! for pricing when present and `Volume` is optional. Only the first ten
//! characters of the date column are read, so full timestamps work too.

use std::{
    fs::File,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::NaiveDate;
use snafu::ResultExt;
use tracing::{debug, info, warn};

use crate::{
    models::{
        bar::{Bar, PriceSeries},
        interval::Interval,
        request_params::PriceRequest,
    },
    providers::{
        CsvSnafu, DataProvider, DataUnavailableSnafu, IoSnafu, ProviderError, ProviderId,
        ValidationSnafu,
    },
};

pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File backing `symbol`.
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

#[async_trait]
impl DataProvider for CsvProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Csv
    }

    async fn fetch_prices(&self, req: &PriceRequest) -> Result<PriceSeries, ProviderError> {
        let path = self.path_for(&req.symbol);
        info!(symbol = %req.symbol, path = %path.display(), "reading CSV prices");

        let bars = read_bars(&req.symbol, &path)?;
        let native = infer_interval(&bars);
        if native.is_coarser_than(req.interval) {
            return ValidationSnafu {
                message: format!(
                    "{} holds {native} bars and cannot serve a {} request",
                    path.display(),
                    req.interval
                ),
            }
            .fail();
        }

        let mut series = PriceSeries::new(req.symbol.clone(), native, bars);
        if let Some(start) = req.start() {
            series = series.since(start.date_naive());
        }
        let series = series
            .until(req.as_of.date_naive())
            .resample(req.interval);

        if series.is_empty() {
            return DataUnavailableSnafu {
                symbol: req.symbol.as_str(),
                reason: format!("no rows of {} inside {}", path.display(), req.period),
            }
            .fail();
        }
        Ok(series)
    }
}

struct Columns {
    date: usize,
    close: usize,
    adj_close: Option<usize>,
    volume: Option<usize>,
}

fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().replace([' ', '-'], "_")
}

fn locate_columns(headers: &csv::StringRecord) -> Option<Columns> {
    let names: Vec<String> = headers.iter().map(normalize_header).collect();
    let find = |candidates: &[&str]| {
        names
            .iter()
            .position(|n| candidates.contains(&n.as_str()))
    };

    Some(Columns {
        date: find(&["date", "datetime", "timestamp", "time"])?,
        close: find(&["close"])?,
        adj_close: find(&["adj_close", "adjclose", "adjusted_close"]),
        volume: find(&["volume"]),
    })
}

fn parse_field(record: &csv::StringRecord, idx: usize) -> Option<f64> {
    record
        .get(idx)
        .and_then(|f| f.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn read_bars(symbol: &str, path: &Path) -> Result<Vec<Bar>, ProviderError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return DataUnavailableSnafu {
                symbol,
                reason: format!("{} does not exist", path.display()),
            }
            .fail();
        }
        Err(err) => return Err(err).context(IoSnafu { path }),
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(file);
    let headers = reader.headers().context(CsvSnafu { path })?.clone();
    let Some(cols) = locate_columns(&headers) else {
        return ValidationSnafu {
            message: format!("{} needs Date and Close columns", path.display()),
        }
        .fail();
    };

    let mut bars = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = record.context(CsvSnafu { path })?;

        let date = record
            .get(cols.date)
            .and_then(|f| f.get(..10))
            .and_then(|f| NaiveDate::parse_from_str(f, "%Y-%m-%d").ok());
        // Yahoo exports write "null" for halted sessions
        let close = parse_field(&record, cols.close);

        match (date, close) {
            (Some(date), Some(close)) => bars.push(Bar {
                date,
                close,
                adj_close: cols.adj_close.and_then(|i| parse_field(&record, i)),
                volume: cols.volume.and_then(|i| parse_field(&record, i)),
            }),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(path = %path.display(), skipped, "skipped CSV rows without a date or close");
    }
    // An adjusted column that is only partly filled would mix price bases.
    if cols.adj_close.is_some() && bars.iter().any(|b| b.adj_close.is_none()) {
        debug!(path = %path.display(), "adjusted close incomplete, using raw close");
        for bar in &mut bars {
            bar.adj_close = None;
        }
    }
    Ok(bars)
}

/// Guesses the spacing of a file from the median gap between rows.
fn infer_interval(bars: &[Bar]) -> Interval {
    let mut dates: Vec<NaiveDate> = bars.iter().map(|b| b.date).collect();
    dates.sort_unstable();
    dates.dedup();
    let mut gaps: Vec<i64> = dates
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days())
        .collect();
    if gaps.is_empty() {
        return Interval::Daily;
    }
    gaps.sort_unstable();
    match gaps[gaps.len() / 2] {
        ..=4 => Interval::Daily,
        5..=10 => Interval::Weekly,
        _ => Interval::Monthly,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, TimeZone, Utc};

    use crate::models::period::Period;

    use super::*;

    fn write(dir: &Path, name: &str, body: &str) {
        std::fs::write(dir.join(name), body).unwrap();
    }

    fn req(interval: Interval) -> PriceRequest {
        PriceRequest::new("SPY", interval, Period::Max)
            .as_of(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn reads_yahoo_style_export() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "SPY.csv",
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             2024-01-03,1,1,1,11.0,10.5,100\n\
             2024-01-02,1,1,1,10.0,9.5,200\n\
             2024-01-04,1,1,1,null,null,0\n",
        );

        let series = CsvProvider::new(dir.path())
            .fetch_prices(&req(Interval::Daily))
            .await
            .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.bars()[0].date.day(), 2);
        assert_eq!(series.bars()[0].price(), 9.5);
        assert_eq!(series.bars()[1].volume, Some(100.0));
    }

    #[tokio::test]
    async fn daily_file_is_resampled_to_monthly() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "SPY.csv",
            "date,close\n2024-01-02,1\n2024-01-03,1.5\n2024-01-31,2\n\
             2024-02-01,3\n2024-02-28,3.5\n2024-02-29,4\n",
        );

        let series = CsvProvider::new(dir.path())
            .fetch_prices(&req(Interval::Monthly))
            .await
            .unwrap();

        assert_eq!(series.interval, Interval::Monthly);
        let closes: Vec<f64> = series.bars().iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![2.0, 4.0]);
    }

    #[tokio::test]
    async fn monthly_file_cannot_serve_daily() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "SPY.csv",
            "Date,Close\n2024-01-01,1\n2024-02-01,2\n2024-03-01,3\n",
        );

        let err = CsvProvider::new(dir.path())
            .fetch_prices(&req(Interval::Daily))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Validation { .. }));
    }

    #[tokio::test]
    async fn missing_file_is_data_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = CsvProvider::new(dir.path())
            .fetch_prices(&req(Interval::Daily))
            .await
            .unwrap_err();
        assert!(err.is_data_unavailable());
    }

    #[tokio::test]
    async fn missing_close_column_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "SPY.csv", "Date,Open\n2024-01-02,1\n");
        let err = CsvProvider::new(dir.path())
            .fetch_prices(&req(Interval::Daily))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Validation { .. }));
    }

    #[test]
    fn timestamps_in_date_column_are_truncated_to_the_day() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("X.csv");
        std::fs::write(&path, "Timestamp,Close\n2024-01-02T14:30:00Z,5\n").unwrap();
        let bars = read_bars("X", &path).unwrap();
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn infers_weekly_spacing() {
        let bars: Vec<Bar> = (0..5)
            .map(|w| Bar {
                date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap() + chrono::Days::new(7 * w),
                close: 1.0,
                adj_close: None,
                volume: None,
            })
            .collect();
        assert_eq!(infer_interval(&bars), Interval::Weekly);
    }
}
