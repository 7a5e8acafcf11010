//! Time-series helpers for presenting daily values
//!
//! Generic grouping, smoothing and gap-filling used by the report commands.
//! Two moving-average flavours exist on purpose: metric charts use a
//! centered window rounded to 2 decimals, the sleep chart a trailing window
//! rounded to 1 decimal.
//!
//! # Examples
//!
//! ```
//! use sleepstat::timeseries::{MovingAverage, format_hours_readable, group_by_week};
//! use sleepstat::aggregation_types::DataPoint;
//! use sleepstat::types::DailyDate;
//! use chrono::NaiveDate;
//!
//! let day = |d| DailyDate::new(NaiveDate::from_ymd_opt(2024, 1, d).unwrap());
//! let weekly = group_by_week(&[DataPoint::new(day(8), 3.0), DataPoint::new(day(10), 4.0)]);
//! assert_eq!(weekly.len(), 1);
//! assert_eq!(weekly[0].value, 7.0);
//!
//! let smoothed = MovingAverage::Trailing.apply(&[6.0, 8.0, 7.0], 7);
//! assert_eq!(smoothed, vec![6.0, 7.0, 7.0]);
//!
//! assert_eq!(format_hours_readable(7.5), "7h 30m");
//! ```

use crate::aggregation_types::{DailySleep, DataPoint, SleepSeriesPoint};
use crate::types::DailyDate;
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;

/// Window used by both moving-average call sites
pub const DEFAULT_WINDOW: usize = 7;

/// Round to a fixed number of decimals
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Average repeated values per date, sorted by date
pub fn group_by_date(points: &[DataPoint]) -> Vec<DataPoint> {
    let mut sums: BTreeMap<DailyDate, (f64, usize)> = BTreeMap::new();
    for point in points {
        let entry = sums.entry(point.date).or_insert((0.0, 0));
        entry.0 += point.value;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(date, (sum, count))| DataPoint::new(date, sum / count as f64))
        .collect()
}

/// Sunday on or before `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

/// Sum values per Sunday-aligned week, keyed by the week's Sunday
pub fn group_by_week(points: &[DataPoint]) -> Vec<DataPoint> {
    let mut weeks: BTreeMap<DailyDate, f64> = BTreeMap::new();
    for point in points {
        let key = DailyDate::new(week_start(*point.date.inner()));
        *weeks.entry(key).or_insert(0.0) += point.value;
    }

    weeks
        .into_iter()
        .map(|(date, value)| DataPoint::new(date, value))
        .collect()
}

/// Moving-average window placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovingAverage {
    /// `[i - (w - 1)/2, i + w/2]` clipped at both ends, rounded to 2 decimals
    ///
    /// An even window leans one point toward the future.
    Centered,
    /// `[i - (w - 1), i]` clipped at the start, rounded to 1 decimal
    Trailing,
}

impl MovingAverage {
    /// Smooth `values`, producing one output per input
    ///
    /// A zero window is treated as a window of one.
    pub fn apply(&self, values: &[f64], window: usize) -> Vec<f64> {
        let window = window.max(1);
        (0..values.len())
            .map(|i| {
                let (lo, hi, decimals) = match self {
                    Self::Centered => (
                        i.saturating_sub((window - 1) / 2),
                        (i + window / 2).min(values.len() - 1),
                        2,
                    ),
                    Self::Trailing => (i.saturating_sub(window - 1), i, 1),
                };
                let slice = &values[lo..=hi];
                round_to(slice.iter().sum::<f64>() / slice.len() as f64, decimals)
            })
            .collect()
    }
}

/// Human-readable duration, e.g. `7h 5m`
pub fn format_hours_readable(hours: f64) -> String {
    let total_minutes = (hours * 60.0).round().max(0.0) as i64;
    format!("{}h {}m", total_minutes / 60, total_minutes % 60)
}

/// One entry per day in `[start, end]`
///
/// Days present in `series` are copied unchanged; absent days get a
/// placeholder whose value, readable string, and moving average are all
/// `None`. Entries outside the range are dropped.
pub fn fill_date_range(
    series: &[SleepSeriesPoint],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<SleepSeriesPoint> {
    let mut by_date: BTreeMap<DailyDate, &SleepSeriesPoint> = BTreeMap::new();
    for point in series {
        by_date.entry(point.date).or_insert(point);
    }

    start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(DailyDate::new)
        .map(|date| {
            by_date
                .get(&date)
                .map(|point| (*point).clone())
                .unwrap_or_else(|| SleepSeriesPoint::missing(date))
        })
        .collect()
}

/// Display series for the sleep chart
///
/// Days with data carry hours, their "Xh Ym" form, and a trailing 7-day
/// moving average over the days that have data; the rest of `[start, end]`
/// is filled with placeholders.
pub fn build_sleep_series(
    daily: &[DailySleep],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<SleepSeriesPoint> {
    let mut sorted: Vec<&DailySleep> = daily.iter().collect();
    sorted.sort_by_key(|d| d.date);

    let hours: Vec<f64> = sorted.iter().map(|d| d.hours).collect();
    let averages = MovingAverage::Trailing.apply(&hours, DEFAULT_WINDOW);

    let points: Vec<SleepSeriesPoint> = sorted
        .iter()
        .zip(averages)
        .map(|(day, avg)| SleepSeriesPoint {
            date: day.date,
            hours: Some(day.hours),
            readable: Some(format_hours_readable(day.hours)),
            moving_avg: Some(avg),
        })
        .collect();

    fill_date_range(&points, start, end)
}
