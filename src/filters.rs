//! Date window filtering
//!
//! A [`DateWindow`] is the inclusive range of local calendar days a report
//! covers. Raw intervals must be loaded for a slightly wider range so a
//! night that crosses midnight at either edge is seen whole; see
//! [`DateWindow::overfetch`].
//!
//! # Examples
//!
//! ```
//! use sleepstat::filters::DateWindow;
//! use chrono::NaiveDate;
//!
//! let window = DateWindow::from_cli(Some("2024-01"), Some("2024-01")).unwrap();
//! assert!(window.contains(&NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()));
//!
//! let fetch = window.overfetch();
//! assert_eq!(fetch.since, NaiveDate::from_ymd_opt(2023, 12, 31));
//! assert_eq!(fetch.until, NaiveDate::from_ymd_opt(2024, 2, 1));
//! ```

use crate::error::{Result, SleepstatError};
use crate::timezone::TimezoneConfig;
use crate::types::SleepInterval;
use chrono::{Datelike, Duration, NaiveDate};

/// Extra days loaded on each side of the requested window
pub const OVERFETCH_DAYS: i64 = 1;

/// Inclusive range of local calendar days; either bound may be open
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    /// First day (inclusive)
    pub since: Option<NaiveDate>,
    /// Last day (inclusive)
    pub until: Option<NaiveDate>,
}

impl DateWindow {
    /// Create a window, rejecting an inverted range
    pub fn new(since: Option<NaiveDate>, until: Option<NaiveDate>) -> Result<Self> {
        if let (Some(since), Some(until)) = (since, until)
            && since > until
        {
            return Err(SleepstatError::InvalidArgument(format!(
                "--since ({since}) is after --until ({until})"
            )));
        }
        Ok(Self { since, until })
    }

    /// Closed window `[since, until]`
    pub fn between(since: NaiveDate, until: NaiveDate) -> Result<Self> {
        Self::new(Some(since), Some(until))
    }

    /// Window with no bounds
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Build a window from `--since` / `--until` strings
    ///
    /// A month given for `until` covers the whole month.
    pub fn from_cli(since: Option<&str>, until: Option<&str>) -> Result<Self> {
        let since = since.map(parse_date_filter).transpose()?;
        let until = until.map(parse_until_filter).transpose()?;
        Self::new(since, until)
    }

    /// Whether `date` lies inside the window
    pub fn contains(&self, date: &NaiveDate) -> bool {
        if let Some(since) = &self.since
            && date < since
        {
            return false;
        }
        if let Some(until) = &self.until
            && date > until
        {
            return false;
        }
        true
    }

    /// The window widened by [`OVERFETCH_DAYS`] on each bounded side
    pub fn overfetch(&self) -> Self {
        let margin = Duration::days(OVERFETCH_DAYS);
        Self {
            since: self.since.and_then(|d| d.checked_sub_signed(margin)),
            until: self.until.and_then(|d| d.checked_add_signed(margin)),
        }
    }

    /// Whether an interval touches the window in local time
    ///
    /// Used on the over-fetched window when loading raw data.
    pub fn overlaps_interval(&self, interval: &SleepInterval, tz: &TimezoneConfig) -> bool {
        let start = tz.local_date(&interval.start);
        let end = tz.local_date(&interval.end);
        if let Some(until) = &self.until
            && start > *until
        {
            return false;
        }
        if let Some(since) = &self.since
            && end < *since
        {
            return false;
        }
        true
    }
}

/// Parse date filter from string
///
/// Accepts dates in YYYY-MM-DD or YYYY-MM format.
/// For YYYY-MM format, defaults to the first day of the month.
///
/// # Example
///
/// ```
/// use sleepstat::filters::parse_date_filter;
/// use chrono::Datelike;
///
/// let date = parse_date_filter("2024-01-15").unwrap();
/// assert_eq!(date.day(), 15);
///
/// let date = parse_date_filter("2024-01").unwrap();
/// assert_eq!(date.day(), 1);
/// ```
pub fn parse_date_filter(date_str: &str) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
        return Ok(date);
    }

    let (year, month) = parse_year_month(date_str)?;
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| SleepstatError::InvalidDate(format!("Invalid date: {date_str}")))
}

/// Like [`parse_date_filter`], but YYYY-MM resolves to the last day of the month
pub fn parse_until_filter(date_str: &str) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
        return Ok(date);
    }

    let (year, month) = parse_year_month(date_str)?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| SleepstatError::InvalidDate(format!("Invalid date: {date_str}")))?;
    Ok(month_bounds(first).1)
}

fn parse_year_month(date_str: &str) -> Result<(i32, u32)> {
    let parts: Vec<&str> = date_str.split('-').collect();
    if parts.len() != 2 {
        return Err(SleepstatError::InvalidDate(format!(
            "Invalid date format '{date_str}', expected YYYY-MM-DD or YYYY-MM"
        )));
    }

    let year = parts[0]
        .parse::<i32>()
        .map_err(|_| SleepstatError::InvalidDate(format!("Invalid year in '{date_str}'")))?;
    let month = parts[1]
        .parse::<u32>()
        .map_err(|_| SleepstatError::InvalidDate(format!("Invalid month in '{date_str}'")))?;

    if !(1..=12).contains(&month) {
        return Err(SleepstatError::InvalidDate(format!(
            "Month must be between 1-12, got {month}"
        )));
    }
    Ok((year, month))
}

/// First and last day of the month containing `date`
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let last = first
        .checked_add_months(chrono::Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(date);
    (first, last)
}
