//! Plain-text report: a statistics table with a mean ± std bar per bucket,
//! a probability chart and, when requested, the backtest curve.

use std::io::{self, Write};

use snafu::ResultExt;

use crate::{
    aggregate::SeasonalProfile,
    backtest::BacktestCurve,
    report::SeasonalityReport,
    sink::{IoSnafu, ReportSink, SinkError},
};

const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const NOW_MARKER: &str = "<- now";
const BACKTEST_TAIL_ROWS: usize = 10;

pub struct TerminalSink<W: Write> {
    out: W,
    half_width: usize,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            half_width: 20,
        }
    }

    /// Characters on each side of the zero axis of the mean ± std chart.
    pub fn with_bar_width(mut self, half_width: usize) -> Self {
        self.half_width = half_width.max(1);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for TerminalSink<W> {
    fn write(&mut self, report: &SeasonalityReport) -> Result<(), SinkError> {
        render(&mut self.out, report, self.half_width).context(IoSnafu)?;
        self.out.flush().context(IoSnafu)
    }
}

fn render(out: &mut impl Write, report: &SeasonalityReport, half: usize) -> io::Result<()> {
    writeln!(
        out,
        "{} seasonality by {} ({} data from {})",
        report.symbol, report.granularity, report.interval, report.provider
    )?;
    match report.data_since {
        Some(since) => writeln!(
            out,
            "Data since {since} with {} frequency, {} observations",
            report.interval, report.observations
        )?,
        None => writeln!(out, "No data")?,
    }
    writeln!(out)?;

    if report.profile.is_empty() {
        writeln!(out, "No defined returns to aggregate.")?;
    } else {
        render_profile(out, report, half)?;
    }

    if let Some(curve) = &report.backtest {
        writeln!(out)?;
        render_backtest(out, report, curve, half * 2)?;
    }
    Ok(())
}

fn render_profile(out: &mut impl Write, report: &SeasonalityReport, half: usize) -> io::Result<()> {
    let profile = &report.profile;
    let granularity = profile.granularity();
    let scale = chart_scale(profile);

    writeln!(
        out,
        "{:<5} {:>8} {:>8} {:>7} {:>6}  mean ± std",
        "key", "mean", "std", "P(>0)", "n"
    )?;
    for (key, stats) in profile.iter() {
        let bar = mean_std_bar(stats.mean, stats.std_dev, scale, half);
        let marker = if key == report.current_key {
            format!("  {NOW_MARKER}")
        } else {
            String::new()
        };
        writeln!(
            out,
            "{:<5} {:>8} {:>8} {:>7} {:>6}  {}{}",
            granularity.key_label(key),
            fmt_pct(stats.mean, true),
            fmt_pct(stats.std_dev, false),
            fmt_pct(stats.prob_positive, false),
            stats.observations,
            bar,
            marker
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Probability of a positive period")?;
    for (key, stats) in profile.iter() {
        let filled = (stats.prob_positive * (half * 2) as f64).round() as usize;
        let marker = if key == report.current_key {
            format!(" {NOW_MARKER}")
        } else {
            String::new()
        };
        writeln!(
            out,
            "{:<5} {:>7}  {}{}",
            granularity.key_label(key),
            fmt_pct(stats.prob_positive, false),
            "#".repeat(filled),
            marker
        )?;
    }
    Ok(())
}

fn render_backtest(
    out: &mut impl Write,
    report: &SeasonalityReport,
    curve: &BacktestCurve,
    width: usize,
) -> io::Result<()> {
    let label = curve.granularity.key_label(curve.key);
    writeln!(
        out,
        "Buying the {label} seasonality at {} frequency (no costs, no compounding)",
        report.interval
    )?;
    if curve.is_empty() {
        writeln!(out, "No {label} periods in the data; nothing to backtest.")?;
        return Ok(());
    }

    let final_value = curve.final_value().unwrap_or(f64::NAN);
    writeln!(
        out,
        "{} periods, cumulative return {}",
        curve.len(),
        fmt_pct(final_value, true)
    )?;
    let values: Vec<f64> = curve.points().iter().map(|p| p.1).collect();
    writeln!(out, "{}", sparkline(&values, width))?;

    writeln!(out, "{:<12} {:>11}", "date", "cumulative")?;
    let skip = curve.len().saturating_sub(BACKTEST_TAIL_ROWS);
    if skip > 0 {
        writeln!(out, "({skip} earlier periods not shown)")?;
    }
    for (date, value) in &curve.points()[skip..] {
        writeln!(out, "{:<12} {:>11}", date.to_string(), fmt_pct(*value, true))?;
    }
    Ok(())
}

/// Largest |mean| + std across buckets, so every bar fits the chart.
fn chart_scale(profile: &SeasonalProfile) -> f64 {
    let scale = profile
        .iter()
        .map(|(_, s)| s.mean.abs() + if s.std_dev.is_finite() { s.std_dev } else { 0.0 })
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max);
    if scale > 0.0 { scale } else { 1.0 }
}

fn cell(v: f64, scale: f64, half: usize) -> i64 {
    if !v.is_finite() {
        return 0;
    }
    let h = half as i64;
    ((v / scale * half as f64).round() as i64).clamp(-h, h)
}

/// `#` from the zero axis `|` to the mean, `-` out to mean ± std.
fn mean_std_bar(mean: f64, std_dev: f64, scale: f64, half: usize) -> String {
    let m = cell(mean, scale, half);
    let (lo, hi) = if std_dev.is_finite() {
        (cell(mean - std_dev, scale, half), cell(mean + std_dev, scale, half))
    } else {
        (m, m)
    };

    let h = half as i64;
    let bar: String = (-h..=h)
        .map(|i| {
            if i == 0 {
                '|'
            } else if (i > 0 && i <= m) || (i < 0 && i >= m) {
                '#'
            } else if i >= lo && i <= hi {
                '-'
            } else {
                ' '
            }
        })
        .collect();
    bar.trim_end().to_string()
}

fn sparkline(values: &[f64], width: usize) -> String {
    let defined: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if defined.is_empty() || width == 0 {
        return String::new();
    }
    let chunk = defined.len().div_ceil(width);
    let sampled: Vec<f64> = defined
        .chunks(chunk)
        .filter_map(|c| c.last().copied())
        .collect();

    let lo = sampled.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = sampled.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let top = (SPARKS.len() - 1) as f64;
    sampled
        .iter()
        .map(|&v| {
            let idx = if hi > lo {
                ((v - lo) / (hi - lo) * top).round() as usize
            } else {
                SPARKS.len() / 2
            };
            SPARKS[idx.min(SPARKS.len() - 1)]
        })
        .collect()
}

fn fmt_pct(v: f64, signed: bool) -> String {
    if v.is_nan() {
        "n/a".to_string()
    } else if signed {
        format!("{:+.2}%", v * 100.0)
    } else {
        format!("{:.2}%", v * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use price_feed::{models::interval::Interval, providers::ProviderId};

    use crate::{
        aggregate::aggregate, backtest::backtest, calendar::Granularity, series::TimeSeries,
    };

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn report(backtest_key: Option<u32>) -> SeasonalityReport {
        let returns = TimeSeries::new(vec![
            (d(2023, 1, 31), f64::NAN),
            (d(2023, 2, 28), 0.02),
            (d(2023, 3, 31), -0.01),
            (d(2024, 2, 29), 0.04),
            (d(2024, 3, 28), 0.03),
        ])
        .unwrap();
        SeasonalityReport {
            symbol: "SPY".to_string(),
            provider: ProviderId::Csv,
            interval: Interval::Monthly,
            granularity: Granularity::Monthly,
            data_since: Some(d(2023, 1, 31)),
            observations: returns.defined_count(),
            current_key: 3,
            profile: aggregate(&returns, Granularity::Monthly),
            backtest: backtest_key
                .map(|k| backtest(&returns, Granularity::Monthly, k).unwrap()),
        }
    }

    fn rendered(report: &SeasonalityReport) -> String {
        let mut sink = TerminalSink::new(Vec::new()).with_bar_width(10);
        sink.write(report).unwrap();
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn header_table_and_now_marker() {
        let text = rendered(&report(None));

        assert!(text.contains("SPY seasonality by month-of-year (monthly data from csv)"));
        assert!(text.contains("Data since 2023-01-31 with monthly frequency, 4 observations"));
        let feb = text.lines().find(|l| l.starts_with("Feb ")).unwrap();
        assert!(feb.contains("+3.00%"));
        assert!(!feb.contains(NOW_MARKER));
        let mar = text.lines().find(|l| l.starts_with("Mar ")).unwrap();
        assert!(mar.ends_with(NOW_MARKER));
        assert!(text.contains("Probability of a positive period"));
        assert!(!text.contains("Buying the"));
    }

    #[test]
    fn backtest_section_lists_cumulative_values() {
        let text = rendered(&report(Some(2)));
        assert!(text.contains("Buying the Feb seasonality at monthly frequency"));
        assert!(text.contains("2 periods, cumulative return +6.00%"));
        assert!(text.contains("2024-02-29"));
    }

    #[test]
    fn empty_backtest_is_reported_not_failed() {
        let text = rendered(&report(Some(12)));
        assert!(text.contains("No Dec periods in the data; nothing to backtest."));
    }

    #[test]
    fn bar_draws_mean_and_whiskers() {
        assert_eq!(mean_std_bar(0.5, 0.25, 1.0, 4), "    |##-");
        assert_eq!(mean_std_bar(-0.5, 0.25, 1.0, 4), " -##|");
        // undefined std draws the mean only
        assert_eq!(mean_std_bar(0.25, f64::NAN, 1.0, 4), "    |#");
    }

    #[test]
    fn sparkline_spans_min_to_max() {
        let line = sparkline(&[0.0, f64::NAN, 0.5, 1.0], 10);
        assert_eq!(line, "▁▅█");
        assert_eq!(sparkline(&[], 10), "");
        assert_eq!(sparkline(&[1.0; 30], 10).chars().count(), 10);
    }

    #[test]
    fn undefined_values_print_as_na() {
        assert_eq!(fmt_pct(f64::NAN, true), "n/a");
        assert_eq!(fmt_pct(0.0123, true), "+1.23%");
        assert_eq!(fmt_pct(0.5, false), "50.00%");
    }
}
