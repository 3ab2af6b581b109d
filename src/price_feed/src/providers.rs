//! Provider abstraction for historical price sources.
//!
//! This module defines the [`DataProvider`] trait, the single interface the
//! analysis pipeline uses to load a price history, whatever the vendor
//! (Yahoo Finance, Alpaca, a directory of CSV files).
//!
//! The trait is async and object safe, so the concrete provider can be picked
//! at runtime (see [`registry::build_provider`]).
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use price_feed::models::{bar::PriceSeries, request_params::PriceRequest};
//! use price_feed::providers::{DataProvider, ProviderError, ProviderId};
//!
//! struct Empty;
//!
//! #[async_trait]
//! impl DataProvider for Empty {
//!     fn id(&self) -> ProviderId {
//!         ProviderId::Csv
//!     }
//!
//!     async fn fetch_prices(&self, req: &PriceRequest) -> Result<PriceSeries, ProviderError> {
//!         Ok(PriceSeries::new(req.symbol.clone(), req.interval, vec![]))
//!     }
//! }
//! ```

pub mod alpaca_rest;
pub mod csv_file;
pub mod registry;
pub mod yahoo;

use std::{fmt, path::PathBuf, str::FromStr};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_utils::env::MissingEnvVarError;
use snafu::{Backtrace, Snafu};

use crate::models::{bar::PriceSeries, request_params::PriceRequest};

/// Trait for fetching a price history from a market data provider.
///
/// Implementations must either return a non-empty series or fail with
/// [`ProviderError::DataUnavailable`]; partial or placeholder data is never
/// returned.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Which upstream this is, for logging and reports.
    fn id(&self) -> ProviderId;

    /// Fetches the price history described by `req`.
    ///
    /// # Returns
    ///
    /// * `Ok(PriceSeries)` - bars ordered by session date, at `req.interval` spacing.
    /// * `Err(ProviderError)` - the request failed or produced no rows.
    async fn fetch_prices(&self, req: &PriceRequest) -> Result<PriceSeries, ProviderError>;
}

/// Which upstream to use (serde snake_case).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    /// Yahoo Finance chart API (no credentials).
    Yahoo,
    /// Alpaca market data REST API.
    Alpaca,
    /// `<SYMBOL>.csv` files in a local directory.
    Csv,
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProviderId::Yahoo => "yahoo",
            ProviderId::Alpaca => "alpaca",
            ProviderId::Csv => "csv",
        };
        f.write_str(s)
    }
}

impl FromStr for ProviderId {
    type Err = ProviderInitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yahoo" => Ok(ProviderId::Yahoo),
            "alpaca" => Ok(ProviderId::Alpaca),
            "csv" => Ok(ProviderId::Csv),
            other => UnknownProviderSnafu {
                code: other.to_string(),
            }
            .fail(),
        }
    }
}

/// Errors that can occur during the creation of a provider instance.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// missed environment variable.
    #[snafu(display("Missing environment variable: {source}"))]
    MissingEnvVar {
        source: MissingEnvVarError,
        backtrace: Backtrace,
    },

    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// API key contains invalid characters.
    #[snafu(display("Invalid API key format: {source}"))]
    InvalidApiKey {
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },

    /// The CSV provider needs a data directory.
    #[snafu(display("CSV provider requires a data directory (--data-dir or SEASONALITY_DATA_DIR)"))]
    MissingDataDir { backtrace: Backtrace },

    /// The configured provider code is not one we know.
    #[snafu(display("Unknown provider {code:?}: expected yahoo, alpaca or csv"))]
    UnknownProvider { code: String, backtrace: Backtrace },
}

/// Errors that can occur within a `DataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// The provider answered, but has no rows for this symbol/interval/period.
    #[snafu(display("No data available for {symbol}: {reason}"))]
    DataUnavailable {
        symbol: String,
        reason: String,
        backtrace: Backtrace,
    },

    /// An error during an API request (e.g., network failure, timeout).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider's API returned a specific error message (e.g., invalid API key).
    #[snafu(display("API error: {message}"))]
    Api {
        message: String,
        backtrace: Backtrace,
    },

    /// The response body did not have the expected shape.
    #[snafu(display("Malformed response: {source}"))]
    Decode {
        source: serde_json::Error,
        backtrace: Backtrace,
    },

    /// The request parameters were invalid for this specific provider.
    #[snafu(display("Invalid parameters for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },

    /// A local data file could not be read.
    #[snafu(display("Failed to read {}: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// A local CSV file could not be parsed.
    #[snafu(display("Failed to parse {}: {source}", path.display()))]
    Csv {
        path: PathBuf,
        source: csv::Error,
        backtrace: Backtrace,
    },

    /// An error during provider configuration or initialization.
    #[snafu(display("Provider initialization error: {source}"))]
    Init {
        #[snafu(backtrace)]
        source: ProviderInitError,
    },
}

impl ProviderInitError {
    /// Settings or credentials are wrong, as opposed to the HTTP stack failing.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, ProviderInitError::ClientBuild { .. })
    }
}

impl ProviderError {
    /// True when the provider worked but the request simply has no data.
    pub fn is_data_unavailable(&self) -> bool {
        matches!(self, ProviderError::DataUnavailable { .. })
    }
}
