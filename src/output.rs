//! Output formatting module for sleepstat
//!
//! This module provides formatters for displaying sleep reports in different formats:
//! - Table format for human-readable terminal output
//! - JSON format for machine-readable output and integration with other tools
//!
//! # Examples
//!
//! ```
//! use sleepstat::output::get_formatter;
//! use sleepstat::aggregation_types::{DailySleep, SleepTotals};
//! use sleepstat::types::DailyDate;
//! use chrono::NaiveDate;
//!
//! let daily = vec![DailySleep {
//!     date: DailyDate::new(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()),
//!     hours: 7.25,
//!     priority: 1,
//!     sources: vec!["Oura".to_string()],
//! }];
//! let totals = SleepTotals::from_daily(&daily);
//!
//! let formatter = get_formatter(false, false);
//! assert!(formatter.format_daily(&daily, &totals).contains("7h 15m"));
//!
//! let json_formatter = get_formatter(true, false);
//! assert!(json_formatter.format_daily(&daily, &totals).contains("\"totals\""));
//! ```

use crate::aggregation_types::{DailySleep, DataPoint, SleepSeriesPoint, SleepTotals};
use crate::timeseries::format_hours_readable;
use colored::*;
use prettytable::{Cell, Row, Table, format, row};
use serde_json::json;

/// Hours at which the trend bar is full
const BAR_MAX_HOURS: f64 = 12.0;
const BAR_WIDTH: usize = 24;
const BAR_FULL: &str = "█";
const BAR_EMPTY: &str = "░";

/// Nights at or above this are shown green
const RESTED_HOURS: f64 = 7.0;
/// Nights at or above this (and below [`RESTED_HOURS`]) are shown yellow
const SHORT_HOURS: f64 = 6.0;

/// Trait for output formatters
///
/// # Example Implementation
///
/// ```
/// use sleepstat::output::OutputFormatter;
/// use sleepstat::aggregation_types::{DailySleep, DataPoint, SleepSeriesPoint, SleepTotals};
///
/// struct CountFormatter;
///
/// impl OutputFormatter for CountFormatter {
///     fn format_daily(&self, data: &[DailySleep], totals: &SleepTotals) -> String {
///         format!("{} nights, {:.1}h average", totals.nights, totals.average_hours)
///     }
///
///     fn format_weekly(&self, data: &[DataPoint]) -> String {
///         format!("{} weeks", data.len())
///     }
///
///     fn format_trend(&self, series: &[SleepSeriesPoint]) -> String {
///         format!("{} days", series.len())
///     }
/// }
/// ```
pub trait OutputFormatter {
    /// Format per-day hours with totals
    fn format_daily(&self, data: &[DailySleep], totals: &SleepTotals) -> String;

    /// Format Sunday-aligned weekly sums
    fn format_weekly(&self, data: &[DataPoint]) -> String;

    /// Format the gap-filled display series
    fn format_trend(&self, series: &[SleepSeriesPoint]) -> String;
}

/// Table formatter for human-readable output
pub struct TableFormatter {
    /// Whether to colour the trend bars
    pub colored_output: bool,
}

impl TableFormatter {
    /// Create a new TableFormatter
    pub fn new(colored_output: bool) -> Self {
        Self { colored_output }
    }

    fn format_hours(hours: f64) -> String {
        format!("{hours:.2}")
    }

    fn create_bar(hours: f64) -> String {
        let ratio = (hours / BAR_MAX_HOURS).clamp(0.0, 1.0);
        let filled = (ratio * BAR_WIDTH as f64).round() as usize;
        format!(
            "{}{}",
            BAR_FULL.repeat(filled),
            BAR_EMPTY.repeat(BAR_WIDTH - filled)
        )
    }

    fn create_colored_bar(&self, hours: f64) -> String {
        let bar = Self::create_bar(hours);
        if !self.colored_output {
            return bar;
        }

        if hours >= RESTED_HOURS {
            bar.green().to_string()
        } else if hours >= SHORT_HOURS {
            bar.yellow().to_string()
        } else {
            bar.red().to_string()
        }
    }

    fn format_totals_row(totals: &SleepTotals) -> Row {
        row![
            b -> "TOTAL",
            b -> Self::format_hours(totals.total_hours),
            b -> format_hours_readable(totals.total_hours),
            "",
            b -> format!(
                "{} nights, avg {}",
                totals.nights,
                format_hours_readable(totals.average_hours)
            )
        ]
    }
}

impl OutputFormatter for TableFormatter {
    fn format_daily(&self, data: &[DailySleep], totals: &SleepTotals) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

        table.set_titles(row![
            b -> "Date",
            b -> "Hours",
            b -> "Duration",
            b -> "Priority",
            b -> "Sources"
        ]);

        for entry in data {
            table.add_row(row![
                entry.date.format("%Y-%m-%d"),
                r -> Self::format_hours(entry.hours),
                r -> format_hours_readable(entry.hours),
                r -> entry.priority,
                entry.sources.join(", ")
            ]);
        }

        table.add_row(Row::new(vec![Cell::new(""); 5]));
        table.add_row(Self::format_totals_row(totals));

        table.to_string()
    }

    fn format_weekly(&self, data: &[DataPoint]) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

        table.set_titles(row![
            b -> "Week of",
            b -> "Hours",
            b -> "Duration"
        ]);

        for week in data {
            table.add_row(row![
                week.date.format("%Y-%m-%d"),
                r -> Self::format_hours(week.value),
                r -> format_hours_readable(week.value)
            ]);
        }

        let total: f64 = data.iter().map(|w| w.value).sum();
        table.add_row(Row::new(vec![Cell::new(""); 3]));
        table.add_row(row![
            b -> "TOTAL",
            b -> Self::format_hours(total),
            b -> format_hours_readable(total)
        ]);

        table.to_string()
    }

    fn format_trend(&self, series: &[SleepSeriesPoint]) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

        table.set_titles(row![
            b -> "Date",
            b -> "Duration",
            b -> "7-day Avg",
            b -> ""
        ]);

        for point in series {
            let avg = point
                .moving_avg
                .map(|avg| format!("{avg:.1}"))
                .unwrap_or_else(|| "-".to_string());
            let bar = point
                .hours
                .map(|hours| self.create_colored_bar(hours))
                .unwrap_or_default();
            table.add_row(row![
                point.date.format("%Y-%m-%d"),
                r -> point.readable.as_deref().unwrap_or("-"),
                r -> avg,
                bar
            ]);
        }

        table.to_string()
    }
}

/// JSON formatter for machine-readable output
///
/// Missing days in the trend series keep explicit `null`s.
pub struct JsonFormatter;

impl JsonFormatter {
    fn render(value: serde_json::Value) -> String {
        serde_json::to_string_pretty(&value).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_daily(&self, data: &[DailySleep], totals: &SleepTotals) -> String {
        Self::render(json!({
            "daily": data.iter().map(|d| json!({
                "date": d.date.format("%Y-%m-%d"),
                "hours": d.hours,
                "readable": format_hours_readable(d.hours),
                "priority": d.priority,
                "sources": d.sources,
            })).collect::<Vec<_>>(),
            "totals": {
                "nights": totals.nights,
                "total_hours": totals.total_hours,
                "average_hours": totals.average_hours,
            }
        }))
    }

    fn format_weekly(&self, data: &[DataPoint]) -> String {
        Self::render(json!({
            "weekly": data.iter().map(|w| json!({
                "week_start": w.date.format("%Y-%m-%d"),
                "hours": w.value,
                "readable": format_hours_readable(w.value),
            })).collect::<Vec<_>>(),
        }))
    }

    fn format_trend(&self, series: &[SleepSeriesPoint]) -> String {
        Self::render(json!({ "trend": series }))
    }
}

/// Get appropriate formatter based on JSON flag
///
/// `colored_output` only affects the table formatter.
pub fn get_formatter(json: bool, colored_output: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter::new(colored_output))
    }
}
