//! Runtime selection of a [`DataProvider`] from [`Settings`].

use std::time::Duration;

use shared_utils::config::Settings;
use snafu::OptionExt;
use tracing::debug;

use crate::providers::{
    DataProvider, MissingDataDirSnafu, ProviderId, ProviderInitError,
    alpaca_rest::AlpacaProvider, csv_file::CsvProvider, yahoo::YahooProvider,
};

/// Parses `settings.provider` into a [`ProviderId`].
pub fn provider_id(settings: &Settings) -> Result<ProviderId, ProviderInitError> {
    settings.provider.parse()
}

/// Builds the provider named by `id`, configured from `settings`.
pub fn build_provider(
    id: ProviderId,
    settings: &Settings,
) -> Result<Box<dyn DataProvider>, ProviderInitError> {
    let timeout = Duration::from_secs(settings.http_timeout_secs);
    debug!(provider = %id, ?timeout, "building provider");

    let provider: Box<dyn DataProvider> = match id {
        ProviderId::Yahoo => Box::new(YahooProvider::new(timeout)?),
        ProviderId::Alpaca => Box::new(AlpacaProvider::new(timeout)?),
        ProviderId::Csv => {
            let dir = settings.data_dir.clone().context(MissingDataDirSnafu)?;
            Box::new(CsvProvider::new(dir))
        }
    };
    Ok(provider)
}
