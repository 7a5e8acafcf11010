//! Main overnight sleep heuristic
//!
//! A merged session counts as the night's main sleep when the sleeper woke
//! in the local morning window, or fell asleep in the evening and stayed
//! asleep long enough. Hours are read in the configured local timezone.
//!
//! Long evening naps can pass and early-morning shift-work sleep can fail;
//! both are accepted limitations of the heuristic.

use crate::config::SleepConfig;
use crate::merge::MergedSession;
use crate::timezone::TimezoneConfig;
use serde::{Deserialize, Serialize};

/// Outcome of classifying one merged session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    /// Shorter than the minimum session length; never classified
    TooShort,
    /// Counts toward the day's hours slept
    MainSleep,
    /// Nap or daytime rest
    NotMainSleep,
}

/// Classifies merged sessions against the configured local-time rules
#[derive(Debug, Clone)]
pub struct SleepClassifier {
    timezone: TimezoneConfig,
    min_session_hours: f64,
    wake_hours: std::ops::RangeInclusive<u32>,
    evening_onset_hour: u32,
    min_evening_hours: f64,
}

impl SleepClassifier {
    pub fn new(config: &SleepConfig, timezone: TimezoneConfig) -> Self {
        Self {
            timezone,
            min_session_hours: config.min_session_hours,
            wake_hours: config.wake_hour_start..=config.wake_hour_end,
            evening_onset_hour: config.evening_onset_hour,
            min_evening_hours: config.min_evening_hours,
        }
    }

    pub fn classify(&self, session: &MergedSession) -> SessionKind {
        if session.hours < self.min_session_hours {
            return SessionKind::TooShort;
        }

        let end_hour = self.timezone.local_hour(&session.end);
        let start_hour = self.timezone.local_hour(&session.start);

        let woke_in_morning = self.wake_hours.contains(&end_hour);
        let slept_through_evening =
            start_hour >= self.evening_onset_hour && session.hours >= self.min_evening_hours;

        if woke_in_morning || slept_through_evening {
            SessionKind::MainSleep
        } else {
            SessionKind::NotMainSleep
        }
    }

    pub fn is_main_sleep(&self, session: &MergedSession) -> bool {
        self.classify(session) == SessionKind::MainSleep
    }
}
