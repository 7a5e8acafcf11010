//! Tunable thresholds and the source priority table
//!
//! Every constant the reconstruction engine relies on lives in
//! [`SleepConfig`] so callers (and tests) can move the boundaries directly.
//!
//! # Examples
//!
//! ```
//! use sleepstat_core::config::{SleepConfig, SourcePriorityTable};
//! use chrono::Duration;
//!
//! let config = SleepConfig::default()
//!     .with_gap_threshold(Duration::minutes(90))
//!     .with_min_session_hours(1.0)
//!     .with_priorities(SourcePriorityTable::default().with_rule("whoop", 1));
//! assert!(config.validate().is_ok());
//! assert_eq!(config.priorities.priority_of("WHOOP 4.0"), 1);
//! ```

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SleepstatError};

/// Sources that match no rule get this priority
pub const DEFAULT_SOURCE_PRIORITY: u8 = 3;

/// One substring rule of the priority table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityRule {
    /// Lowercase substring matched against the lowercased source name
    pub pattern: String,
    /// Lower numbers win
    pub priority: u8,
}

/// Static ranking used to pick one authoritative source per day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePriorityTable {
    rules: Vec<PriorityRule>,
    /// Consulted before `rules`; a matching override decides the priority
    #[serde(default)]
    overrides: Vec<PriorityRule>,
    default_priority: u8,
}

impl Default for SourcePriorityTable {
    fn default() -> Self {
        Self {
            rules: vec![
                PriorityRule {
                    pattern: "oura".to_string(),
                    priority: 1,
                },
                PriorityRule {
                    pattern: "eight sleep".to_string(),
                    priority: 2,
                },
                PriorityRule {
                    pattern: "8sleep".to_string(),
                    priority: 2,
                },
            ],
            overrides: Vec::new(),
            default_priority: DEFAULT_SOURCE_PRIORITY,
        }
    }
}

impl SourcePriorityTable {
    /// A table with no rules; every source gets `default_priority`
    pub fn empty(default_priority: u8) -> Self {
        Self {
            rules: Vec::new(),
            overrides: Vec::new(),
            default_priority,
        }
    }

    /// Add a substring rule (matched case-insensitively)
    pub fn with_rule(mut self, pattern: impl Into<String>, priority: u8) -> Self {
        self.rules.push(PriorityRule {
            pattern: pattern.into().to_lowercase(),
            priority,
        });
        self
    }

    /// Add a rule that takes precedence over every plain rule
    ///
    /// Unlike [`with_rule`](Self::with_rule), an override can demote a
    /// source: `with_override("oura", 3)` ranks Oura below Eight Sleep even
    /// though the built-in rule gives it 1.
    pub fn with_override(mut self, pattern: impl Into<String>, priority: u8) -> Self {
        self.overrides.push(PriorityRule {
            pattern: pattern.into().to_lowercase(),
            priority,
        });
        self
    }

    /// The configured rules in insertion order
    pub fn rules(&self) -> &[PriorityRule] {
        &self.rules
    }

    /// The override rules in insertion order
    pub fn overrides(&self) -> &[PriorityRule] {
        &self.overrides
    }

    /// Priority used for sources matching no rule
    pub fn default_priority(&self) -> u8 {
        self.default_priority
    }

    /// Priority of a source name
    ///
    /// Overrides are consulted first, then plain rules. Within one tier the
    /// best (lowest) matching priority applies.
    pub fn priority_of(&self, source: &str) -> u8 {
        let source = source.to_lowercase();
        Self::best_match(&self.overrides, &source)
            .or_else(|| Self::best_match(&self.rules, &source))
            .unwrap_or(self.default_priority)
    }

    fn best_match(rules: &[PriorityRule], source: &str) -> Option<u8> {
        rules
            .iter()
            .filter(|rule| source.contains(&rule.pattern))
            .map(|rule| rule.priority)
            .min()
    }
}

/// Thresholds for session grouping, filtering, and classification
#[derive(Debug, Clone, PartialEq)]
pub struct SleepConfig {
    /// Gaps strictly larger than this split a source's intervals into sessions
    pub gap_threshold: Duration,
    /// Merged sessions shorter than this are discarded before classification
    pub min_session_hours: f64,
    /// First local wake hour (inclusive) that marks overnight sleep
    pub wake_hour_start: u32,
    /// Last local wake hour (inclusive) that marks overnight sleep
    pub wake_hour_end: u32,
    /// Sessions starting at or after this local hour may count as overnight sleep
    pub evening_onset_hour: u32,
    /// Minimum length of an evening-onset session to count as overnight sleep
    pub min_evening_hours: f64,
    /// Per-day source ranking
    pub priorities: SourcePriorityTable,
}

impl Default for SleepConfig {
    fn default() -> Self {
        Self {
            gap_threshold: Duration::hours(2),
            min_session_hours: 0.5,
            wake_hour_start: 3,
            wake_hour_end: 14,
            evening_onset_hour: 20,
            min_evening_hours: 3.0,
            priorities: SourcePriorityTable::default(),
        }
    }
}

impl SleepConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the session gap threshold
    pub fn with_gap_threshold(mut self, gap: Duration) -> Self {
        self.gap_threshold = gap;
        self
    }

    /// Set the minimum merged session length in hours
    pub fn with_min_session_hours(mut self, hours: f64) -> Self {
        self.min_session_hours = hours;
        self
    }

    /// Set the inclusive local wake window
    pub fn with_wake_window(mut self, start_hour: u32, end_hour: u32) -> Self {
        self.wake_hour_start = start_hour;
        self.wake_hour_end = end_hour;
        self
    }

    /// Set the evening onset rule
    pub fn with_evening_rule(mut self, onset_hour: u32, min_hours: f64) -> Self {
        self.evening_onset_hour = onset_hour;
        self.min_evening_hours = min_hours;
        self
    }

    /// Replace the source priority table
    pub fn with_priorities(mut self, priorities: SourcePriorityTable) -> Self {
        self.priorities = priorities;
        self
    }

    /// Check that thresholds are usable
    pub fn validate(&self) -> Result<()> {
        if self.gap_threshold < Duration::zero() {
            return Err(SleepstatError::Config(
                "gap threshold must not be negative".to_string(),
            ));
        }
        for (name, value) in [
            ("minimum session hours", self.min_session_hours),
            ("minimum evening hours", self.min_evening_hours),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SleepstatError::Config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        for (name, hour) in [
            ("wake window start", self.wake_hour_start),
            ("wake window end", self.wake_hour_end),
            ("evening onset", self.evening_onset_hour),
        ] {
            if hour > 23 {
                return Err(SleepstatError::Config(format!(
                    "{name} hour must be between 0-23, got {hour}"
                )));
            }
        }
        if self.wake_hour_start > self.wake_hour_end {
            return Err(SleepstatError::Config(format!(
                "wake window is inverted ({}..={})",
                self.wake_hour_start, self.wake_hour_end
            )));
        }
        Ok(())
    }
}
