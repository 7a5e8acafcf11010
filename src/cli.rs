//! CLI interface for sleepstat
//!
//! This module defines the command-line interface using clap. Every flag is
//! global, so `sleepstat --json weekly` and `sleepstat weekly --json` are
//! equivalent. Without a subcommand the daily report is shown.
//!
//! # Example
//!
//! ```bash
//! # Daily hours for January 2024
//! sleepstat daily --since 2024-01-01 --until 2024-01-31
//!
//! # Weekly sums as JSON, read from a specific export
//! sleepstat weekly --json --file ~/exports/sleep.jsonl
//!
//! # Trend with a custom priority rule and local zone
//! sleepstat trend --priority whoop=1 --timezone Europe/Berlin
//! ```

use crate::config::{SleepConfig, SourcePriorityTable};
use crate::error::{Result, SleepstatError};
use crate::filters::DateWindow;
use chrono::Duration;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Reconstruct nightly sleep from wearable exports
#[derive(Parser, Debug, Clone)]
#[command(name = "sleepstat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show informational output (default is quiet mode with only warnings and errors)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// First day to report (YYYY-MM-DD or YYYY-MM)
    #[arg(long, global = true)]
    pub since: Option<String>,

    /// Last day to report (YYYY-MM-DD or YYYY-MM, a month covers the whole month)
    #[arg(long, global = true)]
    pub until: Option<String>,

    /// Timezone for local hours and calendar days (e.g. "America/New_York", "UTC")
    /// If not specified, uses the system's local timezone
    #[arg(long, short = 'z', global = true)]
    pub timezone: Option<String>,

    /// Use UTC for local hours and calendar days (overrides --timezone)
    #[arg(long, global = true)]
    pub utc: bool,

    /// Export file or directory to read (repeatable)
    #[arg(long, short = 'f', global = true)]
    pub file: Vec<PathBuf>,

    /// Gap in hours that splits a source's intervals into separate sessions
    #[arg(long, global = true)]
    pub gap_hours: Option<f64>,

    /// Sessions shorter than this many hours are ignored
    #[arg(long, global = true)]
    pub min_session_hours: Option<f64>,

    /// Source priority rule NAME=N (case-insensitive substring, lower wins).
    /// Takes precedence over the built-in ranking, so it can also demote a source
    #[arg(long, global = true, value_parser = parse_priority_rule)]
    pub priority: Vec<(String, u8)>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Hours slept per night with the winning source (default)
    Daily,
    /// Hours slept per Sunday-aligned week
    Weekly,
    /// Every day of the window with a trailing 7-day average
    Trend,
}

impl Cli {
    /// The subcommand, defaulting to [`Command::Daily`]
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Daily)
    }

    /// Thresholds with command-line overrides applied
    ///
    /// # Errors
    ///
    /// Returns an error if an override is not a usable number or the
    /// resulting configuration fails validation
    pub fn sleep_config(&self) -> Result<SleepConfig> {
        let mut config = SleepConfig::default();

        if let Some(hours) = self.gap_hours {
            config = config.with_gap_threshold(hours_to_duration("--gap-hours", hours)?);
        }
        if let Some(hours) = self.min_session_hours {
            config = config.with_min_session_hours(hours);
        }
        if !self.priority.is_empty() {
            let priorities = self
                .priority
                .iter()
                .fold(SourcePriorityTable::default(), |table, (name, priority)| {
                    table.with_override(name.as_str(), *priority)
                });
            config = config.with_priorities(priorities);
        }

        config.validate()?;
        Ok(config)
    }

    /// The requested reporting window
    pub fn window(&self) -> Result<DateWindow> {
        DateWindow::from_cli(self.since.as_deref(), self.until.as_deref())
    }
}

fn hours_to_duration(flag: &str, hours: f64) -> Result<Duration> {
    if !hours.is_finite() || hours < 0.0 {
        return Err(SleepstatError::InvalidArgument(format!(
            "{flag} must be a non-negative number of hours, got {hours}"
        )));
    }
    Ok(Duration::milliseconds((hours * 3_600_000.0).round() as i64))
}

/// Parse a `NAME=N` priority rule
///
/// # Example
///
/// ```
/// use sleepstat::cli::parse_priority_rule;
///
/// assert_eq!(parse_priority_rule("whoop=1").unwrap(), ("whoop".to_string(), 1));
/// assert!(parse_priority_rule("whoop").is_err());
/// ```
pub fn parse_priority_rule(rule: &str) -> Result<(String, u8)> {
    let (name, priority) = rule.rsplit_once('=').ok_or_else(|| {
        SleepstatError::InvalidArgument(format!("Invalid priority rule '{rule}', expected NAME=N"))
    })?;

    let name = name.trim();
    if name.is_empty() {
        return Err(SleepstatError::InvalidArgument(format!(
            "Priority rule '{rule}' has an empty source name"
        )));
    }

    let priority = priority.trim().parse::<u8>().map_err(|_| {
        SleepstatError::InvalidArgument(format!(
            "Priority in '{rule}' must be a number between 0-255"
        ))
    })?;

    Ok((name.to_string(), priority))
}
