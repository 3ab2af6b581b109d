//! Alpaca market data v2 REST provider (US equities).

pub mod params;
pub mod provider;
pub mod response;

pub use provider::AlpacaProvider;
