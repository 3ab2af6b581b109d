//! Output side of a run: where a [`SeasonalityReport`] ends up.

pub mod json;
pub mod terminal;

use snafu::{Backtrace, Snafu};

use crate::report::SeasonalityReport;

pub use json::JsonSink;
pub use terminal::TerminalSink;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SinkError {
    /// The destination rejected the bytes (closed pipe, full disk).
    #[snafu(display("Failed to write report: {source}"))]
    Io {
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// The report could not be converted into the sink's format.
    #[snafu(display("Failed to encode report: {source}"))]
    Encode {
        source: serde_json::Error,
        backtrace: Backtrace,
    },
}

/// A destination for finished reports.
///
/// Rendering is fire-and-forget: nothing a sink produces flows back into the
/// analysis.
pub trait ReportSink {
    fn write(&mut self, report: &SeasonalityReport) -> Result<(), SinkError>;
}
