//! Yahoo Finance chart API (`/v8/finance/chart/{symbol}`).
//!
//! No credentials are needed. Adjusted closes are used when the response
//! carries them, and bar instants are mapped to session dates in the
//! exchange time zone reported in the response metadata.

pub mod provider;
pub mod response;

pub use provider::YahooProvider;
