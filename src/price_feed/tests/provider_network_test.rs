//! Live vendor tests. Run with `cargo test -- --ignored`.

use std::{num::NonZeroU32, time::Duration};

use price_feed::{
    models::{interval::Interval, period::Period, request_params::PriceRequest},
    providers::{DataProvider, alpaca_rest::AlpacaProvider, yahoo::YahooProvider},
};
use serial_test::serial;

#[tokio::test]
#[ignore]
async fn test_yahoo_provider_fetch_monthly() {
    let provider = YahooProvider::new(Duration::from_secs(30)).expect("client");
    let req = PriceRequest::new(
        "^GSPC",
        Interval::Monthly,
        Period::Years(NonZeroU32::new(5).unwrap()),
    );

    let series = provider.fetch_prices(&req).await.expect("fetch");
    assert!(series.len() >= 55, "got {} monthly bars", series.len());
    assert!(series.bars().windows(2).all(|w| w[0].date < w[1].date));
}

#[tokio::test]
#[ignore]
async fn test_yahoo_unknown_symbol_is_unavailable() {
    let provider = YahooProvider::new(Duration::from_secs(30)).expect("client");
    let req = PriceRequest::new("NO_SUCH_TICKER_XYZ", Interval::Daily, Period::Max);

    let err = provider.fetch_prices(&req).await.unwrap_err();
    assert!(err.is_data_unavailable(), "unexpected error: {err}");
}

#[tokio::test]
#[serial]
#[ignore]
async fn test_alpaca_provider_fetch_daily() {
    // This test requires APCA_API_KEY_ID and APCA_API_SECRET_KEY to be set in the environment.
    if std::env::var("APCA_API_KEY_ID").is_err() || std::env::var("APCA_API_SECRET_KEY").is_err() {
        println!("Skipping test_alpaca_provider_fetch_daily: API keys not set.");
        return;
    }

    let provider =
        AlpacaProvider::new(Duration::from_secs(30)).expect("Failed to create AlpacaProvider");
    let req = PriceRequest::new(
        "AAPL",
        Interval::Daily,
        Period::Days(NonZeroU32::new(30).unwrap()),
    );

    let series = provider.fetch_prices(&req).await.expect("fetch");
    assert_eq!(series.symbol, "AAPL");
    assert!(!series.is_empty());
}
