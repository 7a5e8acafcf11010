//! Aggregation data types for sleepstat
//!
//! Pure data structures produced by the reconstruction engine and the
//! time-series helpers. These types carry no behaviour beyond simple totals.

use crate::types::DailyDate;
use serde::{Deserialize, Serialize};

/// Hours slept on one local calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySleep {
    /// Local calendar day of the session end
    pub date: DailyDate,
    /// Hours slept, rounded to 2 decimals
    pub hours: f64,
    /// Priority of the source group that won the day
    pub priority: u8,
    /// Sources whose sessions were summed into `hours`
    pub sources: Vec<String>,
}

/// A dated numeric value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Calendar day (or week start for weekly buckets)
    pub date: DailyDate,
    /// Aggregated value
    pub value: f64,
}

impl DataPoint {
    pub fn new(date: DailyDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// One day of the display series
///
/// Days without data keep explicit `null`s so charts render gaps instead of
/// interpolating across them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepSeriesPoint {
    pub date: DailyDate,
    pub hours: Option<f64>,
    /// "Xh Ym"
    pub readable: Option<String>,
    #[serde(rename = "movingAvg")]
    pub moving_avg: Option<f64>,
}

impl SleepSeriesPoint {
    /// Placeholder for a day with no data
    pub fn missing(date: DailyDate) -> Self {
        Self {
            date,
            hours: None,
            readable: None,
            moving_avg: None,
        }
    }
}

/// Summary across all reported nights
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SleepTotals {
    /// Number of days with a resolved value
    pub nights: usize,
    /// Sum of hours across those days
    pub total_hours: f64,
    /// Mean hours per reported night (0 when there are none)
    pub average_hours: f64,
}

impl SleepTotals {
    pub fn from_daily(daily: &[DailySleep]) -> Self {
        let nights = daily.len();
        let total_hours: f64 = daily.iter().map(|d| d.hours).sum();
        let average_hours = if nights == 0 {
            0.0
        } else {
            total_hours / nights as f64
        };
        Self {
            nights,
            total_hours,
            average_hours,
        }
    }
}
