use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use secrecy::{ExposeSecret, SecretString};
use shared_utils::env::get_env_var;
use snafu::ResultExt;
use tracing::{debug, info};

use crate::{
    models::{
        bar::{Bar, PriceSeries},
        request_params::PriceRequest,
    },
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, DataUnavailableSnafu, DecodeSnafu,
        InvalidApiKeySnafu, MissingEnvVarSnafu, ProviderError, ProviderId, ProviderInitError,
        ReqwestSnafu,
        alpaca_rest::{
            params::construct_params,
            response::{AlpacaBar, AlpacaResponse},
        },
    },
    tz::{US_EQUITY_TZ, session_date},
};

const BASE_URL: &str = "https://data.alpaca.markets/v2/stocks/bars";

pub struct AlpacaProvider {
    client: Client,
    _api_key: SecretString,
    _secret_key: SecretString,
}

impl AlpacaProvider {
    /// Creates a new Alpaca provider.
    ///
    /// Reads API keys from the `APCA_API_KEY_ID` and `APCA_API_SECRET_KEY`
    /// environment variables.
    pub fn new(timeout: Duration) -> Result<Self, ProviderInitError> {
        let api_key =
            SecretString::new(get_env_var("APCA_API_KEY_ID").context(MissingEnvVarSnafu)?.into());
        let secret_key = SecretString::new(
            get_env_var("APCA_API_SECRET_KEY")
                .context(MissingEnvVarSnafu)?
                .into(),
        );

        let mut headers = header::HeaderMap::new();
        let mut key_header =
            header::HeaderValue::from_str(api_key.expose_secret()).context(InvalidApiKeySnafu)?;
        key_header.set_sensitive(true);
        let mut secret_header = header::HeaderValue::from_str(secret_key.expose_secret())
            .context(InvalidApiKeySnafu)?;
        secret_header.set_sensitive(true);
        headers.insert("APCA-API-KEY-ID", key_header);
        headers.insert("APCA-API-SECRET-KEY", secret_header);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            _api_key: api_key,
            _secret_key: secret_key,
        })
    }
}

#[async_trait]
impl DataProvider for AlpacaProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Alpaca
    }

    async fn fetch_prices(&self, req: &PriceRequest) -> Result<PriceSeries, ProviderError> {
        info!(
            symbol = %req.symbol,
            interval = %req.interval,
            period = %req.period,
            "requesting Alpaca bars"
        );

        let mut all_bars: Vec<AlpacaBar> = Vec::new();
        let mut next_page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let mut query_params = construct_params(req);
            if let Some(token) = &next_page_token {
                query_params.push(("page_token".to_string(), token.clone()));
            }

            let response = self
                .client
                .get(BASE_URL)
                .query(&query_params)
                .send()
                .await
                .context(ReqwestSnafu)?;

            if !response.status().is_success() {
                let status = response.status();
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown API error".to_string());
                return ApiSnafu {
                    message: format!("HTTP {status}: {error_msg}"),
                }
                .fail();
            }

            let body = response.text().await.context(ReqwestSnafu)?;
            let page: AlpacaResponse = serde_json::from_str(&body).context(DecodeSnafu)?;
            pages += 1;

            // Merge the bars from the current page; only the requested symbol is kept.
            if let Some(mut by_symbol) = page.bars {
                if let Some(bars) = by_symbol.swap_remove(&req.symbol) {
                    all_bars.extend(bars);
                }
            }

            match page.next_page_token {
                Some(token) => next_page_token = Some(token),
                None => break,
            }
        }
        debug!(symbol = %req.symbol, pages, bars = all_bars.len(), "Alpaca pagination done");

        if all_bars.is_empty() {
            return DataUnavailableSnafu {
                symbol: req.symbol.as_str(),
                reason: format!("no {} bars in the requested window", req.interval),
            }
            .fail();
        }

        // adjustment=all means `c` is already the adjusted close
        let bars = all_bars
            .into_iter()
            .map(|ab| Bar {
                date: session_date(ab.timestamp, US_EQUITY_TZ),
                close: ab.close,
                adj_close: None,
                volume: Some(ab.volume),
            })
            .collect();

        Ok(PriceSeries::new(req.symbol.clone(), req.interval, bars))
    }
}
