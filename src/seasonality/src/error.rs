use chrono::NaiveDate;
use price_feed::providers::ProviderError;
use thiserror::Error;

use crate::calendar::Granularity;

/// The unified error type for the `seasonality` crate.
///
/// Undefined returns and empty results are not errors; they degrade to NaN
/// points and empty profiles/curves.
#[derive(Debug, Error)]
pub enum SeasonalityError {
    /// The provider has no rows for the symbol/interval/period.
    #[error("No data available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Unrecognized interval or daily sub-mode. Raised before any data is fetched.
    #[error("Invalid granularity configuration: {0}")]
    InvalidGranularityConfiguration(String),

    /// The backtest key lies outside the granularity's key range.
    #[error(
        "Backtest key {key} is outside the {granularity} range {}..={}",
        .granularity.key_range().start(),
        .granularity.key_range().end()
    )]
    InvalidBacktestKey { key: u32, granularity: Granularity },

    /// Dates must be strictly increasing.
    #[error("Timestamps out of order at index {index} ({date})")]
    UnorderedTimestamps { index: usize, date: NaiveDate },

    /// Any other provider failure (network, API, decode, ...).
    #[error("Provider error")]
    Provider(#[from] ProviderError),
}

impl SeasonalityError {
    /// Folds the provider's own "no data" variant into [`SeasonalityError::DataUnavailable`].
    pub fn from_provider(symbol: &str, err: ProviderError) -> Self {
        match err {
            ProviderError::DataUnavailable { reason, .. } => SeasonalityError::DataUnavailable {
                symbol: symbol.to_string(),
                reason,
            },
            other => SeasonalityError::Provider(other),
        }
    }

    /// Configuration problems, as opposed to data or transport problems.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SeasonalityError::InvalidGranularityConfiguration(_)
                | SeasonalityError::InvalidBacktestKey { .. }
        )
    }
}
