#![allow(dead_code)]

use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};
use price_feed::models::{interval::Interval, period::Period, request_params::PriceRequest};

/// Directory holding the checked-in `<SYMBOL>.csv` fixtures.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// The evening after the last fixture session.
pub fn fixture_as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 29, 0, 0, 0).unwrap()
}

pub fn spy_request(interval: Interval, period: Period) -> PriceRequest {
    PriceRequest::new("SPY", interval, period).as_of(fixture_as_of())
}
