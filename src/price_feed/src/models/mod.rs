pub mod bar;
pub mod interval;
pub mod period;
pub mod request_params;

use thiserror::Error;

/// Errors raised while parsing request parameters from user input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("Invalid interval {input:?}: expected daily, weekly or monthly (1d, 1wk, 1mo)")]
    InvalidInterval { input: String },

    #[error("Invalid period {input:?}: {message}")]
    InvalidPeriod { input: String, message: String },
}
