//! sleepstat - Reconstruct nightly sleep from wearable exports

use chrono::NaiveDate;
use sleepstat::{
    aggregation::DailyAggregator,
    aggregation_types::{DailySleep, DataPoint, SleepTotals},
    cli::{Cli, Command},
    data_loader::DataLoader,
    error::Result,
    filters::DateWindow,
    output::get_formatter,
    timeseries::{build_sleep_series, group_by_week},
    timezone::TimezoneConfig,
};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Days the trend series spans
///
/// Open window bounds fall back to the first or last day with data.
fn series_range(window: &DateWindow, daily: &[DailySleep]) -> Option<(NaiveDate, NaiveDate)> {
    let first = daily.first().map(|d| *d.date.inner());
    let last = daily.last().map(|d| *d.date.inner());
    let start = window.since.or(first)?;
    let end = window.until.or(last)?;
    (start <= end).then_some((start, end))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // --verbose overrides RUST_LOG
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("sleepstat=info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sleepstat=warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let tz_config = TimezoneConfig::from_cli(cli.timezone.as_deref(), cli.utc)?;
    info!("Using timezone: {}", tz_config.display_name());

    let config = cli.sleep_config()?;
    let window = cli.window()?;

    let data_loader = if cli.file.is_empty() {
        DataLoader::new().await?
    } else {
        DataLoader::from_paths(cli.file.clone())?
    };
    let intervals = data_loader
        .load_window(&window.overfetch(), &tz_config)
        .await?;
    info!("Loaded {} sleep intervals", intervals.len());

    let aggregator = DailyAggregator::new(config, tz_config);
    let daily = aggregator.aggregate_detailed(intervals, &window);

    let colored_output = !cli.no_color
        && std::env::var("NO_COLOR").is_err()
        && is_terminal::is_terminal(std::io::stdout());
    let formatter = get_formatter(cli.json, colored_output);

    match cli.command() {
        Command::Daily => {
            info!("Running daily sleep report");
            let totals = SleepTotals::from_daily(&daily);
            println!("{}", formatter.format_daily(&daily, &totals));
        }
        Command::Weekly => {
            info!("Running weekly sleep report");
            let points: Vec<DataPoint> = daily
                .iter()
                .map(|d| DataPoint::new(d.date, d.hours))
                .collect();
            println!("{}", formatter.format_weekly(&group_by_week(&points)));
        }
        Command::Trend => {
            info!("Running sleep trend report");
            let series = series_range(&window, &daily)
                .map(|(start, end)| build_sleep_series(&daily, start, end))
                .unwrap_or_default();
            println!("{}", formatter.format_trend(&series));
        }
    }

    Ok(())
}
