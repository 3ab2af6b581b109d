//! Seasonality of asset returns.
//!
//! The pipeline is a chain of pure functions over explicit values:
//!
//! ```text
//! DataProvider ─▶ TimeSeries (prices) ─▶ pct_change ─▶ aggregate ─▶ ReportSink
//!                                                  └──▶ backtest ──┘
//! ```
//!
//! [`analyzer::analyze`] wires the stages together for one symbol.

pub mod aggregate;
pub mod analyzer;
pub mod backtest;
pub mod calendar;
pub mod cli;
pub mod error;
pub mod report;
pub mod returns;
pub mod series;
pub mod sink;

pub use error::SeasonalityError;
