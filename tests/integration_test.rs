//! Integration tests for sleepstat
//!
//! These run the full pipeline: export files on disk, the data loader,
//! the aggregator, and the presentation helpers.

mod common;

use common::{
    ENV_MUTEX, SleepIntervalBuilder, assert_approx_eq, create_test_data_dir, date,
    generate_nights, ts, write_jsonl,
};
use sleepstat::{
    aggregation::DailyAggregator,
    aggregation_types::{DataPoint, SleepTotals},
    config::{SleepConfig, SourcePriorityTable},
    data_loader::{DATA_PATH_ENV, DataLoader},
    filters::DateWindow,
    output::{JsonFormatter, OutputFormatter},
    timeseries::{build_sleep_series, group_by_week},
    timezone::TimezoneConfig,
    types::{DailyDate, SleepStage},
};
use tempfile::TempDir;

fn utc() -> TimezoneConfig {
    TimezoneConfig::new(chrono_tz::Tz::UTC)
}

fn january() -> DateWindow {
    DateWindow::between(date(2024, 1, 1), date(2024, 1, 31)).unwrap()
}

#[tokio::test]
async fn test_end_to_end_daily_from_jsonl() {
    let lines = vec![
        // Overlapping Oura night, duplicated verbatim
        SleepIntervalBuilder::new()
            .with_span(ts(2024, 1, 1, 23, 0), ts(2024, 1, 2, 1, 0))
            .to_jsonl(),
        SleepIntervalBuilder::new()
            .with_span(ts(2024, 1, 2, 0, 30), ts(2024, 1, 2, 2, 0))
            .with_stage(SleepStage::Deep)
            .to_jsonl(),
        SleepIntervalBuilder::new()
            .with_span(ts(2024, 1, 2, 0, 30), ts(2024, 1, 2, 2, 0))
            .with_stage(SleepStage::Deep)
            .to_jsonl(),
        // Awake segment is not sleep
        SleepIntervalBuilder::new()
            .with_span(ts(2024, 1, 2, 2, 0), ts(2024, 1, 2, 4, 0))
            .with_stage(SleepStage::Awake)
            .to_jsonl(),
        // Lower-priority source on the same night
        SleepIntervalBuilder::new()
            .with_span(ts(2024, 1, 1, 22, 0), ts(2024, 1, 2, 6, 0))
            .with_source("Apple Watch")
            .to_jsonl(),
        // Only source on the next night
        SleepIntervalBuilder::new()
            .with_span(ts(2024, 1, 2, 23, 0), ts(2024, 1, 3, 6, 15))
            .with_source("Apple Watch")
            .to_jsonl(),
        "garbage line".to_string(),
    ];
    let (_temp_dir, loader) = create_test_data_dir(lines).await;

    let window = january();
    let intervals = loader.load_window(&window.overfetch(), &utc()).await.unwrap();
    assert_eq!(intervals.len(), 5);

    let aggregator = DailyAggregator::new(SleepConfig::default(), utc());
    let daily = aggregator.aggregate_detailed(intervals, &window);

    assert_eq!(daily.len(), 2);
    assert_eq!(daily[0].date.to_string(), "2024-01-02");
    assert_eq!(daily[0].hours, 3.0);
    assert_eq!(daily[0].sources, vec!["Oura Ring".to_string()]);
    assert_eq!(daily[1].date.to_string(), "2024-01-03");
    assert_eq!(daily[1].hours, 7.25);
    assert_eq!(daily[1].priority, 3);

    let totals = SleepTotals::from_daily(&daily);
    assert_eq!(totals.nights, 2);
    assert_approx_eq(totals.average_hours, 5.125, 1e-9);
}

#[tokio::test]
async fn test_overfetch_keeps_night_crossing_window_start() {
    // An early-evening segment on the day before the window, then the night
    // proper waking on the window's first day
    let lines = vec![
        SleepIntervalBuilder::new()
            .with_span(ts(2024, 1, 31, 20, 0), ts(2024, 1, 31, 22, 0))
            .to_jsonl(),
        SleepIntervalBuilder::new()
            .with_span(ts(2024, 1, 31, 22, 30), ts(2024, 2, 1, 6, 0))
            .to_jsonl(),
    ];
    let (_temp_dir, loader) = create_test_data_dir(lines).await;
    let window = DateWindow::between(date(2024, 2, 1), date(2024, 2, 29)).unwrap();
    let aggregator = DailyAggregator::new(SleepConfig::default(), utc());

    let intervals = loader.load_window(&window.overfetch(), &utc()).await.unwrap();
    let result = aggregator.aggregate(intervals, &window);
    assert_eq!(result.values().copied().collect::<Vec<_>>(), vec![9.5]);

    // Without the margin the early-evening segment is never loaded
    let intervals = loader.load_window(&window, &utc()).await.unwrap();
    let result = aggregator.aggregate(intervals, &window);
    assert_eq!(result.values().copied().collect::<Vec<_>>(), vec![7.5]);
}

#[tokio::test]
async fn test_json_array_and_jsonl_files_are_combined() {
    let temp_dir = TempDir::new().unwrap();
    write_jsonl(
        &temp_dir,
        "oura.jsonl",
        &[SleepIntervalBuilder::new()
            .with_span(ts(2024, 1, 4, 23, 0), ts(2024, 1, 5, 6, 0))
            .to_jsonl()],
    )
    .await;
    tokio::fs::write(
        temp_dir.path().join("health.json"),
        r#"[{"uuid":"hk-1","startDate":"2024-01-05 23:30:00 +0000","endDate":"2024-01-06 07:00:00 +0000","sourceName":"Apple Watch","value":"HKCategoryValueSleepAnalysisAsleepCore"}]"#,
    )
    .await
    .unwrap();

    let loader = DataLoader::from_paths(vec![temp_dir.path().to_path_buf()]).unwrap();
    let intervals = loader.load_window(&DateWindow::unbounded(), &utc()).await.unwrap();
    assert_eq!(intervals.len(), 2);
    assert!(intervals.iter().any(|i| i.id.as_str() == "hk-1"));

    let aggregator = DailyAggregator::new(SleepConfig::default(), utc());
    let result = aggregator.aggregate(intervals, &january());
    assert_eq!(result.get(&DailyDate::new(date(2024, 1, 5))), Some(&7.0));
    assert_eq!(result.get(&DailyDate::new(date(2024, 1, 6))), Some(&7.5));
}

#[tokio::test]
async fn test_data_path_from_environment() {
    let temp_dir = TempDir::new().unwrap();
    write_jsonl(
        &temp_dir,
        "sleep.jsonl",
        &[SleepIntervalBuilder::new().to_jsonl()],
    )
    .await;

    let loader = {
        let _lock = ENV_MUTEX.lock().await;
        let original = std::env::var(DATA_PATH_ENV).ok();
        // Note: env functions are unsafe in Rust 1.82+ due to thread-safety concerns
        unsafe {
            std::env::set_var(DATA_PATH_ENV, temp_dir.path());
        }

        let loader = DataLoader::new().await;

        unsafe {
            match original {
                Some(value) => std::env::set_var(DATA_PATH_ENV, value),
                None => std::env::remove_var(DATA_PATH_ENV),
            }
        }
        loader.expect("Failed to create DataLoader")
    };

    assert!(loader.paths().iter().any(|p| p == temp_dir.path()));
    let files = loader.find_data_files().await.unwrap();
    assert!(files.iter().any(|f| f.ends_with("sleep.jsonl")));
}

#[test]
fn test_month_of_nights_weekly_and_trend() {
    // Evenings of Jan 6..=Jan 19, waking Jan 7..=Jan 20
    let intervals = generate_nights(date(2024, 1, 6), 14, "Oura", 7.5);
    let aggregator = DailyAggregator::new(SleepConfig::default(), utc());
    let daily = aggregator.aggregate_detailed(intervals, &january());
    assert_eq!(daily.len(), 14);
    assert!(daily.iter().all(|d| d.hours == 7.5));

    let points: Vec<DataPoint> = daily
        .iter()
        .map(|d| DataPoint::new(d.date, d.hours))
        .collect();
    let weekly = group_by_week(&points);
    // Jan 7 and Jan 14 are Sundays; Jan 20 is a Saturday
    assert_eq!(weekly.len(), 2);
    assert_eq!(weekly[0].date.to_string(), "2024-01-07");
    assert_approx_eq(weekly[0].value, 52.5, 1e-9);
    assert_eq!(weekly[1].date.to_string(), "2024-01-14");
    assert_approx_eq(weekly[1].value, 52.5, 1e-9);

    let series = build_sleep_series(&daily, date(2024, 1, 5), date(2024, 1, 21));
    assert_eq!(series.len(), 17);
    assert!(series[0].hours.is_none());
    assert!(series[1].hours.is_none());
    assert_eq!(series[2].readable.as_deref(), Some("7h 30m"));
    assert_eq!(series[2].moving_avg, Some(7.5));
    assert!(series[16].moving_avg.is_none());

    let json = JsonFormatter.format_trend(&series);
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(value["trend"][0]["movingAvg"].is_null());
}

#[test]
fn test_custom_priority_table() {
    let intervals = vec![
        SleepIntervalBuilder::new().with_source("Oura").build(),
        SleepIntervalBuilder::new()
            .with_span(ts(2024, 1, 1, 22, 0), ts(2024, 1, 2, 7, 0))
            .with_source("Whoop")
            .build(),
    ];
    let config = SleepConfig::default()
        .with_priorities(SourcePriorityTable::empty(5).with_rule("whoop", 1));
    let aggregator = DailyAggregator::new(config, utc());
    let daily = aggregator.aggregate_detailed(intervals, &january());
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0].hours, 9.0);
    assert_eq!(daily[0].sources, vec!["Whoop".to_string()]);
}

#[test]
fn test_same_priority_sources_are_summed() {
    let intervals = vec![
        SleepIntervalBuilder::new()
            .with_span(ts(2024, 1, 1, 23, 0), ts(2024, 1, 2, 6, 0))
            .with_source("Apple Watch")
            .build(),
        SleepIntervalBuilder::new()
            .with_span(ts(2024, 1, 2, 8, 0), ts(2024, 1, 2, 9, 0))
            .with_source("iPhone")
            .build(),
    ];
    let aggregator = DailyAggregator::new(SleepConfig::default(), utc());
    let daily = aggregator.aggregate_detailed(intervals, &january());
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0].hours, 8.0);
    assert_eq!(
        daily[0].sources,
        vec!["Apple Watch".to_string(), "iPhone".to_string()]
    );
}
