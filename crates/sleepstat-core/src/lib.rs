//! Core types, traits, and utilities for sleepstat
//!
//! This crate provides the foundational types, error handling,
//! timezone configuration, and tunable thresholds used by the
//! sleep reconstruction engine and its command-line front end.

pub mod aggregation_types;
pub mod config;
pub mod error;
pub mod timezone;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use config::{SleepConfig, SourcePriorityTable};
pub use error::{Result, SleepstatError};
pub use types::{DailyDate, RecordId, SleepInterval, SleepStage, SourceName};
