use std::io::Write;

use snafu::ResultExt;

use crate::{
    report::SeasonalityReport,
    sink::{EncodeSnafu, IoSnafu, ReportSink, SinkError},
};

/// Pretty-printed JSON, one document per report. Undefined values become `null`.
pub struct JsonSink<W: Write> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for JsonSink<W> {
    fn write(&mut self, report: &SeasonalityReport) -> Result<(), SinkError> {
        serde_json::to_writer_pretty(&mut self.out, report).context(EncodeSnafu)?;
        writeln!(self.out).context(IoSnafu)?;
        self.out.flush().context(IoSnafu)
    }
}
