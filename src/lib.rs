//! sleepstat - Reconstruct nightly sleep from wearable exports
//!
//! This library turns raw, possibly duplicated and overlapping sleep-stage
//! intervals from several devices into one trustworthy "hours slept" value
//! per local calendar day:
//! - Remove exact duplicate records
//! - Split each source's intervals into sessions and merge overlaps
//! - Keep only main overnight sleep
//! - Pick the highest-priority source per day
//! - Build weekly sums and smoothed display series
//!
//! # Examples
//!
//! ```no_run
//! use sleepstat::{
//!     aggregation::DailyAggregator,
//!     config::SleepConfig,
//!     data_loader::DataLoader,
//!     filters::DateWindow,
//!     timezone::TimezoneConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> sleepstat::Result<()> {
//!     let tz = TimezoneConfig::default();
//!     let window = DateWindow::from_cli(Some("2024-01"), Some("2024-01"))?;
//!
//!     // Load one extra day on each side so nights crossing the edges are whole
//!     let data_loader = DataLoader::new().await?;
//!     let intervals = data_loader.load_window(&window.overfetch(), &tz).await?;
//!
//!     let aggregator = DailyAggregator::new(SleepConfig::default(), tz);
//!     for (date, hours) in aggregator.aggregate(intervals, &window) {
//!         println!("{date}: {hours}");
//!     }
//!     Ok(())
//! }
//! ```

pub use sleepstat_core::{aggregation_types, config, error, timezone, types};

pub mod aggregation;
pub mod classifier;
pub mod cli;
pub mod data_loader;
pub mod dedup;
pub mod filters;
pub mod merge;
pub mod output;
pub mod resolver;
pub mod sessions;
pub mod timeseries;

// Re-export commonly used types
pub use sleepstat_core::{
    DailyDate, RecordId, Result, SleepConfig, SleepInterval, SleepStage, SleepstatError,
    SourceName, SourcePriorityTable,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
