//! Core domain types for sleepstat
//!
//! This module contains the fundamental types used throughout the sleepstat library.
//! These types provide strong typing for sleep stages, device sources, record
//! identifiers, calendar days, and the sleep intervals themselves.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Sleep stage reported by a device for one interval
///
/// Only [`SleepStage::Core`], [`SleepStage::Deep`] and [`SleepStage::Rem`]
/// count as actual sleep. The remaining stages are recognised so they can be
/// filtered out explicitly rather than rejected as unknown.
///
/// # Examples
/// ```
/// use sleepstat_core::types::SleepStage;
/// use std::str::FromStr;
///
/// assert_eq!(SleepStage::from_str("REM").unwrap(), SleepStage::Rem);
/// assert_eq!(SleepStage::from_str("asleepCore").unwrap(), SleepStage::Core);
/// assert!(SleepStage::Deep.is_actual_sleep());
/// assert!(!SleepStage::InBed.is_actual_sleep());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepStage {
    /// Core (light) sleep
    Core,
    /// Deep sleep
    Deep,
    /// REM sleep
    Rem,
    /// Awake while in bed
    Awake,
    /// In bed, not necessarily asleep
    InBed,
    /// Asleep without a stage breakdown
    Asleep,
}

impl SleepStage {
    /// Stable lowercase name used for display and serialization
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Deep => "deep",
            Self::Rem => "rem",
            Self::Awake => "awake",
            Self::InBed => "in_bed",
            Self::Asleep => "asleep",
        }
    }

    /// Whether intervals of this stage contribute to hours slept
    pub const fn is_actual_sleep(&self) -> bool {
        matches!(self, Self::Core | Self::Deep | Self::Rem)
    }
}

impl fmt::Display for SleepStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SleepStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let normalized: String = lowered
            .trim_start_matches("hkcategoryvaluesleepanalysis")
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect();

        match normalized.as_str() {
            "core" | "asleepcore" | "light" => Ok(Self::Core),
            "deep" | "asleepdeep" => Ok(Self::Deep),
            "rem" | "asleeprem" => Ok(Self::Rem),
            "awake" => Ok(Self::Awake),
            "inbed" => Ok(Self::InBed),
            "asleep" | "asleepunspecified" => Ok(Self::Asleep),
            _ => Err(format!("Invalid sleep stage: {s}")),
        }
    }
}

/// Device or app that recorded an interval
///
/// Source names are free-form strings as reported by the exporting platform
/// (e.g. "Oura", "Eight Sleep", "Apple Watch").
///
/// # Examples
/// ```
/// use sleepstat_core::types::SourceName;
///
/// let source = SourceName::new("Oura");
/// assert_eq!(source.as_str(), "Oura");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceName(String);

impl SourceName {
    /// Create a new SourceName
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SourceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Opaque unique identifier of a raw record
///
/// Carried through for traceability only; it never takes part in
/// duplicate detection or any other comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(String);

impl RecordId {
    /// Create a new RecordId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier for records exported without one
    pub fn generate() -> Self {
        Self(format!("generated-{}", Uuid::new_v4()))
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Local calendar day used as the aggregation key
///
/// Serializes as `YYYY-MM-DD`, which also makes it usable as a JSON map key.
///
/// # Examples
/// ```
/// use sleepstat_core::types::DailyDate;
/// use chrono::NaiveDate;
///
/// let daily = DailyDate::new(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
/// assert_eq!(daily.to_string(), "2024-01-15");
/// assert_eq!(daily.format("%B %d, %Y"), "January 15, 2024");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DailyDate(NaiveDate);

impl DailyDate {
    /// Create a new DailyDate
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Get the inner NaiveDate
    pub fn inner(&self) -> &NaiveDate {
        &self.0
    }

    /// Calendar day of a UTC instant as observed in `tz`
    pub fn from_timestamp_with_tz(ts: &DateTime<Utc>, tz: &Tz) -> Self {
        Self(ts.with_timezone(tz).date_naive())
    }

    /// Format with a chrono format string
    pub fn format(&self, fmt: &str) -> String {
        self.0.format(fmt).to_string()
    }
}

impl fmt::Display for DailyDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl From<NaiveDate> for DailyDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

/// One exported interval exactly as it appears in a data file
///
/// Field aliases accept HealthKit-style exports (`startDate`, `endDate`,
/// `sourceName`, `value`) alongside the plain names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSleepRecord {
    /// Unique identifier of the record, if the exporter provides one
    #[serde(default, alias = "uuid")]
    pub id: Option<String>,
    /// Interval start timestamp
    #[serde(alias = "startDate")]
    pub start: String,
    /// Interval end timestamp
    #[serde(alias = "endDate")]
    pub end: String,
    /// Device or app that recorded the interval
    #[serde(alias = "sourceName")]
    pub source: String,
    /// Sleep stage label
    #[serde(alias = "value")]
    pub stage: String,
}

/// A single `[start, end)` sleep-stage interval from one source
///
/// # Examples
/// ```
/// use sleepstat_core::types::{SleepInterval, SleepStage, SourceName};
/// use chrono::{TimeZone, Utc};
///
/// let interval = SleepInterval::new(
///     Utc.with_ymd_and_hms(2024, 1, 1, 23, 0, 0).unwrap(),
///     Utc.with_ymd_and_hms(2024, 1, 2, 1, 0, 0).unwrap(),
///     SourceName::new("Oura"),
///     SleepStage::Core,
/// );
/// assert!(interval.is_valid());
/// assert_eq!(interval.duration().num_hours(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepInterval {
    /// Opaque record identifier, ignored for comparisons
    pub id: RecordId,
    /// Inclusive start
    pub start: DateTime<Utc>,
    /// Exclusive end
    pub end: DateTime<Utc>,
    /// Recording device or app
    pub source: SourceName,
    /// Sleep stage
    pub stage: SleepStage,
}

impl SleepInterval {
    /// Create an interval with a generated record id
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        source: SourceName,
        stage: SleepStage,
    ) -> Self {
        Self {
            id: RecordId::generate(),
            start,
            end,
            source,
            stage,
        }
    }

    /// Replace the record id
    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = id;
        self
    }

    /// Intervals with `end <= start` have no duration and are discarded
    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }

    /// Elapsed time covered by this interval
    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }

    /// Create from a raw exported record
    ///
    /// Returns `None` for records that cannot take part in sleep
    /// reconstruction: unparseable timestamps, unknown or non-sleep stages,
    /// and empty sources. Zero or negative durations are kept here and
    /// dropped by the engine, so they can be counted there.
    pub fn from_raw(raw: RawSleepRecord) -> Option<Self> {
        let stage = match SleepStage::from_str(&raw.stage) {
            Ok(stage) => stage,
            Err(e) => {
                tracing::debug!("Skipping record: {e}");
                return None;
            }
        };
        if !stage.is_actual_sleep() {
            tracing::trace!(stage = %stage, "Skipping non-sleep stage");
            return None;
        }

        let source = raw.source.trim();
        if source.is_empty() {
            tracing::debug!("Skipping record without source");
            return None;
        }

        let start = parse_timestamp(&raw.start)?;
        let end = parse_timestamp(&raw.end)?;

        let id = raw
            .id
            .filter(|id| !id.is_empty())
            .map(RecordId::new)
            .unwrap_or_else(RecordId::generate);

        Some(Self {
            id,
            start,
            end,
            source: SourceName::new(source),
            stage,
        })
    }
}

/// Parse an RFC 3339 timestamp or a HealthKit export timestamp
/// (`2024-01-01 23:00:00 -0800`) into UTC
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S %z"))
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| tracing::debug!("Invalid timestamp '{value}': {e}"))
        .ok()
}
