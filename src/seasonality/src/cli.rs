use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use price_feed::{models::ParamError, providers::ProviderInitError};
use shared_utils::config::{ConfigError, Settings};

use crate::{calendar::CalendarKey, error::SeasonalityError};

/// Exit status for bad flags or settings, the same one clap uses for usage errors.
pub const EXIT_CONFIGURATION: u8 = 2;
/// Exit status for data, provider and output failures.
pub const EXIT_FAILURE: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Tables and text charts.
    #[default]
    Text,
    /// The full report as pretty JSON.
    Json,
}

/// Seasonality of an asset's returns by month, week, weekday or day of month.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Symbol in the provider's notation (e.g. "AAPL", "^GSPC")
    #[arg(long)]
    pub symbol: String,

    /// Sampling interval: monthly, weekly or daily (1mo, 1wk, 1d)
    #[arg(long)]
    pub interval: String,

    /// Lookback period: max, ytd, 60d, 12wk, 6mo, 5y [default: from config, else max]
    #[arg(long)]
    pub period: Option<String>,

    /// How daily returns are bucketed: by-weekday or by-day-of-month
    #[arg(long, default_value = "by-weekday")]
    pub daily: String,

    /// Run the naive backtest for this calendar key (month 1-12, ISO week 1-53, weekday 0-6 with Monday=0, day 1-31)
    #[arg(long, value_name = "KEY")]
    pub backtest: Option<CalendarKey>,

    /// Price source: yahoo, alpaca or csv [default: from config, else yahoo]
    #[arg(long)]
    pub provider: Option<String>,

    /// Directory of <SYMBOL>.csv files for the csv provider
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Path to a TOML settings file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Flags win over file and environment settings.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(provider) = &self.provider {
            settings.provider = provider.trim().to_lowercase();
        }
        if let Some(dir) = &self.data_dir {
            settings.data_dir = Some(dir.clone());
        }
        if let Some(period) = &self.period {
            settings.period = period.trim().to_string();
        }
    }
}

/// Exit status of a failed run, chosen from anywhere in the error chain.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    let configuration = err.chain().any(|cause| {
        cause
            .downcast_ref::<SeasonalityError>()
            .is_some_and(SeasonalityError::is_configuration)
            || cause
                .downcast_ref::<ProviderInitError>()
                .is_some_and(ProviderInitError::is_configuration)
            || cause.is::<ParamError>()
            || cause.is::<ConfigError>()
    });
    if configuration {
        EXIT_CONFIGURATION
    } else {
        EXIT_FAILURE
    }
}
