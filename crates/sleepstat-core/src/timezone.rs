//! Timezone utilities for calendar-day attribution
//!
//! Sleep sessions are attributed to the local calendar day of their end time
//! and classified by local hour of day, so every computation that touches
//! dates goes through a [`TimezoneConfig`] passed in explicitly rather than
//! the process environment.

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;
use std::str::FromStr;
use tracing::debug;

use crate::error::{Result, SleepstatError};
use crate::types::DailyDate;

/// Configuration for timezone handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimezoneConfig {
    /// The timezone used for local hours and calendar days
    pub tz: Tz,
    /// Whether the timezone is UTC
    pub is_utc: bool,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self::new(get_local_timezone())
    }
}

impl TimezoneConfig {
    /// Create a configuration for a known zone
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            is_utc: tz == Tz::UTC,
        }
    }

    /// Create a configuration from an IANA zone identifier
    pub fn from_name(name: &str) -> Result<Self> {
        let tz = Tz::from_str(name).map_err(|_| {
            SleepstatError::InvalidTimezone(format!(
                "'{name}'. Use format like 'America/New_York', 'Europe/Berlin', or 'UTC'"
            ))
        })?;
        Ok(Self::new(tz))
    }

    /// Create a new timezone configuration from CLI arguments
    pub fn from_cli(timezone_str: Option<&str>, use_utc: bool) -> Result<Self> {
        if use_utc {
            return Ok(Self::new(Tz::UTC));
        }

        match timezone_str {
            Some(name) => Self::from_name(name),
            None => Ok(Self::default()),
        }
    }

    /// Get the display name for the configured timezone
    pub fn display_name(&self) -> &str {
        if self.is_utc { "UTC" } else { self.tz.name() }
    }

    /// Local hour of day (0-23) of a UTC instant
    pub fn local_hour(&self, ts: &DateTime<Utc>) -> u32 {
        ts.with_timezone(&self.tz).hour()
    }

    /// Local calendar day of a UTC instant
    pub fn local_date(&self, ts: &DateTime<Utc>) -> NaiveDate {
        ts.with_timezone(&self.tz).date_naive()
    }

    /// Local calendar day of a UTC instant as an aggregation key
    pub fn daily_date(&self, ts: &DateTime<Utc>) -> DailyDate {
        DailyDate::from_timestamp_with_tz(ts, &self.tz)
    }
}

/// Detect the system's local timezone
///
/// Checks `TZ` first, then asks the platform via `iana-time-zone`.
/// Falls back to UTC when neither yields a known zone.
pub fn get_local_timezone() -> Tz {
    if let Ok(tz_str) = std::env::var("TZ")
        && let Ok(tz) = Tz::from_str(&tz_str)
    {
        debug!("Using timezone from TZ environment variable: {}", tz_str);
        return tz;
    }

    match iana_time_zone::get_timezone() {
        Ok(tz_str) => match Tz::from_str(&tz_str) {
            Ok(tz) => {
                debug!("Using system timezone from iana-time-zone: {}", tz_str);
                tz
            }
            Err(_) => {
                debug!(
                    "Could not parse timezone from iana-time-zone: '{}', falling back to UTC",
                    tz_str
                );
                Tz::UTC
            }
        },
        Err(e) => {
            debug!(
                "Could not detect local timezone via iana-time-zone: {:?}, falling back to UTC",
                e
            );
            Tz::UTC
        }
    }
}
