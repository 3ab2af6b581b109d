//! Exchange time zone handling.
//!
//! Vendors stamp daily and coarser bars with a UTC instant (usually the local
//! session open or local midnight). Seasonality keys must come from the
//! exchange-local calendar date, otherwise a Tokyo bar stamped 15:00Z the day
//! before lands in the wrong weekday, or a monthly bar stamped at local
//! midnight lands in the previous month.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Time zone of US equity sessions (Alpaca, and the fallback for Yahoo).
pub const US_EQUITY_TZ: Tz = chrono_tz::America::New_York;

/// The provider named a time zone chrono-tz does not know.
#[derive(Debug, Error)]
#[error("Unknown IANA time zone: {0}")]
pub struct UnknownTimeZone(pub String);

/// Parses an IANA zone name such as `"Europe/Berlin"`.
pub fn parse_tz(name: &str) -> Result<Tz, UnknownTimeZone> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| UnknownTimeZone(name.to_string()))
}

/// Calendar date of `ts` in the exchange's time zone.
pub fn session_date(ts: DateTime<Utc>, tz: Tz) -> NaiveDate {
    ts.with_timezone(&tz).date_naive()
}

/// Session date of a Unix timestamp (seconds), or `None` if out of range.
pub fn session_date_from_unix(secs: i64, tz: Tz) -> Option<NaiveDate> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .map(|ts| session_date(ts, tz))
}
