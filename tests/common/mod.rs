//! Common test utilities and helpers for sleepstat tests
//!
//! This module provides reusable test utilities, mock data generators,
//! and helper functions to make testing easier and more consistent.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use sleepstat::{
    data_loader::DataLoader,
    types::{RecordId, SleepInterval, SleepStage, SourceName},
};
use tempfile::TempDir;
use tokio::fs;
use tokio::io::AsyncWriteExt;

// Global mutex to serialize environment variable modifications in tests
#[allow(dead_code)]
pub static ENV_MUTEX: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

/// Common test sources, one per default priority level
#[allow(dead_code)]
pub const TEST_SOURCES: &[&str] = &["Oura Ring", "Eight Sleep Pod", "Apple Watch"];

/// UTC timestamp shorthand
pub fn ts(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .unwrap()
}

/// Calendar day shorthand
#[allow(dead_code)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Builder for creating test SleepInterval instances
pub struct SleepIntervalBuilder {
    id: Option<String>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    source: String,
    stage: SleepStage,
}

impl SleepIntervalBuilder {
    /// Create a new builder: 23:00-07:00 on the night of 2024-01-01, Oura, core
    pub fn new() -> Self {
        Self {
            id: None,
            start: ts(2024, 1, 1, 23, 0),
            end: ts(2024, 1, 2, 7, 0),
            source: TEST_SOURCES[0].to_string(),
            stage: SleepStage::Core,
        }
    }

    #[allow(dead_code)]
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_span(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Start at `start` and last `minutes`
    #[allow(dead_code)]
    pub fn with_minutes(mut self, start: DateTime<Utc>, minutes: i64) -> Self {
        self.start = start;
        self.end = start + Duration::minutes(minutes);
        self
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = source.to_string();
        self
    }

    #[allow(dead_code)]
    pub fn with_stage(mut self, stage: SleepStage) -> Self {
        self.stage = stage;
        self
    }

    /// Build the SleepInterval
    pub fn build(self) -> SleepInterval {
        let interval = SleepInterval::new(
            self.start,
            self.end,
            SourceName::new(&self.source),
            self.stage,
        );
        match self.id {
            Some(id) => interval.with_id(RecordId::new(id)),
            None => interval,
        }
    }

    /// Build as a JSONL line in the export format
    #[allow(clippy::wrong_self_convention, dead_code)]
    pub fn to_jsonl(self) -> String {
        let mut record = serde_json::json!({
            "start": self.start.to_rfc3339(),
            "end": self.end.to_rfc3339(),
            "source": self.source,
            "stage": self.stage.as_str(),
        });
        if let Some(id) = self.id {
            record["id"] = serde_json::Value::String(id);
        }
        record.to_string()
    }
}

impl Default for SleepIntervalBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One night per day for `nights` days, starting the evening of `first_evening`
///
/// Each night runs from 23:00 UTC for `hours` and is split in two halves
/// with a 30 minute overlap so merging is exercised.
#[allow(dead_code)]
pub fn generate_nights(
    first_evening: NaiveDate,
    nights: u32,
    source: &str,
    hours: f64,
) -> Vec<SleepInterval> {
    let minutes = (hours * 60.0).round() as i64;
    let mut intervals = Vec::new();
    for night in 0..nights {
        let evening = first_evening + Duration::days(i64::from(night));
        let start = Utc.from_utc_datetime(&evening.and_hms_opt(23, 0, 0).unwrap());
        let middle = start + Duration::minutes(minutes / 2);
        let end = start + Duration::minutes(minutes);
        intervals.push(
            SleepIntervalBuilder::new()
                .with_span(start, middle + Duration::minutes(30))
                .with_source(source)
                .build(),
        );
        intervals.push(
            SleepIntervalBuilder::new()
                .with_span(middle, end)
                .with_source(source)
                .with_stage(SleepStage::Deep)
                .build(),
        );
    }
    intervals
}

/// Write JSONL lines to `name` inside `dir`
#[allow(dead_code)]
pub async fn write_jsonl(dir: &TempDir, name: &str, lines: &[String]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = fs::File::create(&path).await.unwrap();
    for line in lines {
        file.write_all(line.as_bytes()).await.unwrap();
        file.write_all(b"\n").await.unwrap();
    }
    file.flush().await.unwrap();
    path
}

/// Helper to create a test data directory with one JSONL file
#[allow(dead_code)]
pub async fn create_test_data_dir(lines: Vec<String>) -> (TempDir, DataLoader) {
    let temp_dir = TempDir::new().unwrap();
    write_jsonl(&temp_dir, "sleep.jsonl", &lines).await;
    let loader = DataLoader::from_paths(vec![temp_dir.path().to_path_buf()])
        .expect("Failed to create DataLoader");
    (temp_dir, loader)
}

/// Assert that two float values are approximately equal
#[allow(dead_code)]
pub fn assert_approx_eq(a: f64, b: f64, tolerance: f64) {
    assert!(
        (a - b).abs() <= tolerance,
        "Values are not approximately equal: {} != {} (tolerance: {})",
        a,
        b,
        tolerance
    );
}
