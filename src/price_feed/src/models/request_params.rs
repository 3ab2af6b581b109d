use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{interval::Interval, period::Period};
use crate::providers::alpaca_rest::params::AlpacaBarsParams;

/// Universal parameters for requesting a price history from any provider.
///
/// Vendor-agnostic; it is the standard input for every
/// [`DataProvider`](crate::providers::DataProvider) implementation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PriceRequest {
    /// Symbol to request, in the provider's own notation (e.g. `"AAPL"`, `"^GSPC"`).
    pub symbol: String,

    /// Spacing of the returned bars.
    pub interval: Interval,

    /// Lookback window ending at [`PriceRequest::as_of`].
    pub period: Period,

    /// End of the requested history. Also the reference instant for `period`.
    pub as_of: DateTime<Utc>,

    /// Optional, provider-specific parameters.
    #[serde(default)]
    pub provider_specific: ProviderParams,
}

impl PriceRequest {
    /// A request ending now, with no provider-specific options.
    pub fn new(symbol: impl Into<String>, interval: Interval, period: Period) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            period,
            as_of: Utc::now(),
            provider_specific: ProviderParams::None,
        }
    }

    /// Pins the request to a fixed end instant.
    pub fn as_of(mut self, as_of: DateTime<Utc>) -> Self {
        self.as_of = as_of;
        self
    }

    /// Inclusive UTC start of the requested window, `None` for all history.
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.period.start(self.as_of)
    }
}

/// Per-request options for a particular provider, kept out of the universal
/// [`PriceRequest`] fields.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub enum ProviderParams {
    #[default]
    None,
    Alpaca(AlpacaBarsParams),
}
