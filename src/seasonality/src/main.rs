use std::{io, process::ExitCode};

use anyhow::{Context, Result};
use clap::Parser;
use price_feed::{
    models::period::Period,
    providers::registry::{build_provider, provider_id},
};
use seasonality::{
    analyzer::{AnalysisRequest, analyze},
    calendar::Granularity,
    cli::{Cli, OutputFormat, exit_code},
    sink::{JsonSink, ReportSink, TerminalSink},
};
use shared_utils::config::Settings;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // logs go to stderr so stdout stays clean for --format json
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")
        .and_then(|runtime| runtime.block_on(run(cli)));

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(exit_code(&err))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    // configuration errors surface before any network traffic
    let granularity = Granularity::resolve(&cli.interval, &cli.daily)?;
    if let Some(key) = cli.backtest {
        granularity.check_key(key)?;
    }

    let mut settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    cli.apply_overrides(&mut settings);
    let period: Period = settings
        .period
        .parse()
        .with_context(|| format!("invalid period {:?}", settings.period))?;

    let id = provider_id(&settings)?;
    let provider = build_provider(id, &settings)
        .with_context(|| format!("failed to set up the {id} provider"))?;
    info!(symbol = %cli.symbol, %granularity, %period, provider = %id, "starting analysis");

    let request = AnalysisRequest::new(cli.symbol.clone(), granularity, period)
        .with_backtest(cli.backtest);
    let report = analyze(provider.as_ref(), &request)
        .await
        .with_context(|| format!("seasonality analysis of {} failed", cli.symbol))?;

    let stdout = io::stdout().lock();
    match cli.format {
        OutputFormat::Text => TerminalSink::new(stdout).write(&report)?,
        OutputFormat::Json => JsonSink::new(stdout).write(&report)?,
    }
    Ok(())
}
