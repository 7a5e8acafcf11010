//! Basic usage example for the sleepstat library
//!
//! Loads sleep exports from `$SLEEPSTAT_DATA_PATH` (or the platform data
//! directory), reconstructs the last 30 days, and prints a trend.

use chrono::{Duration, Utc};
use sleepstat::{
    Result,
    aggregation::DailyAggregator,
    aggregation_types::SleepTotals,
    config::SleepConfig,
    data_loader::DataLoader,
    filters::DateWindow,
    timeseries::build_sleep_series,
    timezone::TimezoneConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let tz = TimezoneConfig::default();
    let today = tz.local_date(&Utc::now());
    let start = today - Duration::days(29);
    let window = DateWindow::between(start, today)?;

    // Load one extra day on each side of the window
    let data_loader = DataLoader::new().await?;
    let intervals = data_loader.load_window(&window.overfetch(), &tz).await?;
    println!("Loaded {} sleep intervals", intervals.len());

    let aggregator = DailyAggregator::new(SleepConfig::default(), tz);
    let daily = aggregator.aggregate_detailed(intervals, &window);

    println!("\nLast 30 nights ({}):", tz.display_name());
    println!("====================");
    for point in build_sleep_series(&daily, start, today) {
        println!(
            "{}  {:>7}  avg {}",
            point.date,
            point.readable.as_deref().unwrap_or("-"),
            point
                .moving_avg
                .map(|avg| format!("{avg:.1}h"))
                .unwrap_or_else(|| "-".to_string())
        );
    }

    let totals = SleepTotals::from_daily(&daily);
    println!(
        "\n{} nights recorded, {:.2}h on average",
        totals.nights, totals.average_hours
    );

    Ok(())
}
