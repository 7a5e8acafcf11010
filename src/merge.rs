//! Interval union within a session
//!
//! Overlapping or touching intervals are collapsed into a minimal set of
//! disjoint `[start, end)` spans so overlapping stage records (and devices
//! that report both a coarse and a fine-grained breakdown) are only counted
//! once.

use crate::types::SleepInterval;
use chrono::{DateTime, Utc};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// A half-open time range
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Span {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Span {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Length in fractional hours
    pub fn hours(&self) -> f64 {
        (self.end - self.start).num_milliseconds() as f64 / MILLIS_PER_HOUR
    }
}

impl From<&SleepInterval> for Span {
    fn from(interval: &SleepInterval) -> Self {
        Self::new(interval.start, interval.end)
    }
}

/// Duration and bounds of a session after merging
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergedSession {
    /// Total covered time in fractional hours
    pub hours: f64,
    /// Earliest merged start
    pub start: DateTime<Utc>,
    /// Latest merged end
    pub end: DateTime<Utc>,
}

/// Collapse overlapping and touching spans
///
/// The result is sorted by start and pairwise disjoint with gaps between
/// consecutive spans. Spans sharing an endpoint are merged.
pub fn merge_spans(spans: &[Span]) -> Vec<Span> {
    let mut sorted = spans.to_vec();
    sorted.sort();

    let mut merged: Vec<Span> = Vec::with_capacity(sorted.len());
    for span in sorted {
        match merged.last_mut() {
            Some(current) if span.start <= current.end => {
                current.end = current.end.max(span.end);
            }
            _ => merged.push(span),
        }
    }
    merged
}

/// Sum of span lengths in hours
pub fn total_hours(spans: &[Span]) -> f64 {
    spans.iter().map(Span::hours).sum()
}

/// Merge one session's intervals and report covered hours and bounds
///
/// Returns `None` for an empty slice.
pub fn merge_session(intervals: &[SleepInterval]) -> Option<MergedSession> {
    let spans: Vec<Span> = intervals.iter().map(Span::from).collect();
    let merged = merge_spans(&spans);
    let first = merged.first()?;
    let last = merged.last()?;

    Some(MergedSession {
        hours: total_hours(&merged),
        start: first.start,
        end: last.end,
    })
}
