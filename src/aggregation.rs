//! Daily sleep aggregation
//!
//! [`DailyAggregator`] wires the reconstruction stages together:
//!
//! 1. drop intervals whose end is not after their start
//! 2. remove exact duplicates ([`crate::dedup`])
//! 3. partition by source and split each source into sessions ([`crate::sessions`])
//! 4. merge each session's intervals ([`crate::merge`])
//! 5. keep main overnight sleep only ([`crate::classifier`])
//! 6. pick one source priority per local day ([`crate::resolver`])
//! 7. keep days inside the requested window
//!
//! The aggregator is a pure function of its input. A session crossing
//! midnight must be fully present to be merged and classified correctly, so
//! callers should load raw intervals for [`DateWindow::overfetch`] of the
//! requested window. Nothing here corrects a window that was fetched too
//! narrowly.
//!
//! # Examples
//!
//! ```
//! use sleepstat::aggregation::DailyAggregator;
//! use sleepstat::config::SleepConfig;
//! use sleepstat::filters::DateWindow;
//! use sleepstat::timezone::TimezoneConfig;
//! use sleepstat::types::{SleepInterval, SleepStage, SourceName};
//! use chrono::{NaiveDate, TimeZone, Utc};
//!
//! let aggregator = DailyAggregator::new(
//!     SleepConfig::default(),
//!     TimezoneConfig::new(chrono_tz::Tz::UTC),
//! );
//!
//! let night = SleepInterval::new(
//!     Utc.with_ymd_and_hms(2024, 1, 1, 23, 0, 0).unwrap(),
//!     Utc.with_ymd_and_hms(2024, 1, 2, 6, 30, 0).unwrap(),
//!     SourceName::new("Oura"),
//!     SleepStage::Core,
//! );
//!
//! let window = DateWindow::between(
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
//! )
//! .unwrap();
//!
//! let daily = aggregator.aggregate(vec![night], &window);
//! assert_eq!(daily.values().copied().collect::<Vec<_>>(), vec![7.5]);
//! ```

use crate::aggregation_types::DailySleep;
use crate::classifier::{SessionKind, SleepClassifier};
use crate::config::SleepConfig;
use crate::dedup::deduplicate;
use crate::filters::DateWindow;
use crate::merge::merge_session;
use crate::resolver::{QualifiedSession, SourceResolver};
use crate::sessions::group_sessions;
use crate::timezone::TimezoneConfig;
use crate::types::{DailyDate, SleepInterval, SourceName};
use std::collections::BTreeMap;
use tracing::debug;

/// Reconstructs hours slept per local calendar day
#[derive(Debug, Clone)]
pub struct DailyAggregator {
    config: SleepConfig,
    timezone_config: TimezoneConfig,
    classifier: SleepClassifier,
    resolver: SourceResolver,
}

impl DailyAggregator {
    /// Create an aggregator for the given thresholds and local timezone
    pub fn new(config: SleepConfig, timezone_config: TimezoneConfig) -> Self {
        let classifier = SleepClassifier::new(&config, timezone_config);
        let resolver = SourceResolver::new(config.priorities.clone());
        Self {
            config,
            timezone_config,
            classifier,
            resolver,
        }
    }

    /// Thresholds in use
    pub fn config(&self) -> &SleepConfig {
        &self.config
    }

    /// Get the timezone configuration
    pub fn timezone_config(&self) -> &TimezoneConfig {
        &self.timezone_config
    }

    /// Map of local date to hours slept, restricted to `window`
    ///
    /// Dates with no qualifying session are absent rather than zero.
    pub fn aggregate(
        &self,
        intervals: Vec<SleepInterval>,
        window: &DateWindow,
    ) -> BTreeMap<DailyDate, f64> {
        self.aggregate_detailed(intervals, window)
            .into_iter()
            .map(|day| (day.date, day.hours))
            .collect()
    }

    /// Per-day records with the winning priority and sources, sorted by date
    pub fn aggregate_detailed(
        &self,
        intervals: Vec<SleepInterval>,
        window: &DateWindow,
    ) -> Vec<DailySleep> {
        let qualified = self.qualified_sessions(intervals);
        let mut daily = self.resolver.resolve(qualified);
        daily.retain(|day| window.contains(day.date.inner()));

        debug!(days = daily.len(), "Resolved daily sleep");
        daily
    }

    /// Main-sleep sessions tagged with the local date of their end
    fn qualified_sessions(&self, intervals: Vec<SleepInterval>) -> Vec<QualifiedSession> {
        let total = intervals.len();
        let valid: Vec<SleepInterval> = intervals.into_iter().filter(|i| i.is_valid()).collect();
        if valid.len() < total {
            debug!(
                dropped = total - valid.len(),
                "Dropped intervals with non-positive duration"
            );
        }

        let mut by_source: BTreeMap<SourceName, Vec<SleepInterval>> = BTreeMap::new();
        for interval in deduplicate(valid) {
            by_source
                .entry(interval.source.clone())
                .or_default()
                .push(interval);
        }

        let mut qualified = Vec::new();
        for (source, intervals) in by_source {
            let sessions = group_sessions(&intervals, self.config.gap_threshold);
            debug!(%source, sessions = sessions.len(), "Grouped source intervals");

            for session in &sessions {
                let Some(merged) = merge_session(session.intervals()) else {
                    continue;
                };

                match self.classifier.classify(&merged) {
                    SessionKind::MainSleep => qualified.push(QualifiedSession {
                        date: self.timezone_config.daily_date(&merged.end),
                        source: source.clone(),
                        hours: merged.hours,
                    }),
                    kind => debug!(
                        %source,
                        start = %merged.start,
                        end = %merged.end,
                        hours = merged.hours,
                        ?kind,
                        "Session excluded"
                    ),
                }
            }
        }

        qualified
    }
}
