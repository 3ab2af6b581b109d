use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::request_params::{PriceRequest, ProviderParams};

/// Alpaca's historical equity data begins in 2016; `max` starts here.
pub fn earliest_available() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Largest page Alpaca serves.
pub const MAX_PAGE_LIMIT: u32 = 10_000;

/// Specifies the corporate action adjustment for stock data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    Raw,
    Split,
    Dividend,
    /// Split and dividend adjusted; what seasonality returns are computed on.
    #[default]
    All,
}

impl Adjustment {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Adjustment::Raw => "raw",
            Adjustment::Split => "split",
            Adjustment::Dividend => "dividend",
            Adjustment::All => "all",
        }
    }
}

/// Specifies the source feed for stock data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    Sip,
    /// The only feed available on free plans.
    #[default]
    Iex,
    Otc,
}

impl Feed {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Feed::Sip => "sip",
            Feed::Iex => "iex",
            Feed::Otc => "otc",
        }
    }
}

/// Alpaca-specific parameters for a bars request.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct AlpacaBarsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment: Option<Adjustment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed: Option<Feed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Builds the query string for one page of `/v2/stocks/bars`.
pub fn construct_params(req: &PriceRequest) -> Vec<(String, String)> {
    let alpaca = match &req.provider_specific {
        ProviderParams::Alpaca(p) => p.clone(),
        ProviderParams::None => AlpacaBarsParams::default(),
    };
    let start = req
        .start()
        .map_or_else(earliest_available, |s| s.max(earliest_available()));
    let limit = alpaca.limit.unwrap_or(MAX_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);

    vec![
        ("symbols".to_string(), req.symbol.clone()),
        ("timeframe".to_string(), req.interval.as_alpaca_str().to_string()),
        (
            "start".to_string(),
            start.to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
        (
            "end".to_string(),
            req.as_of.to_rfc3339_opts(SecondsFormat::Secs, true),
        ),
        (
            "adjustment".to_string(),
            alpaca.adjustment.unwrap_or_default().as_str().to_string(),
        ),
        (
            "feed".to_string(),
            alpaca.feed.unwrap_or_default().as_str().to_string(),
        ),
        ("limit".to_string(), limit.to_string()),
        ("sort".to_string(), "asc".to_string()),
    ]
}
