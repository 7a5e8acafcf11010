//! Gap-based session grouping
//!
//! A session is a maximal run of one source's intervals in which no interval
//! starts more than the gap threshold after everything seen so far has ended.
//! The comparison is against the session's running end (its high-water mark),
//! not the previous interval's end, so a long interval keeps the session open
//! across shorter ones nested inside it.

use crate::types::SleepInterval;
use chrono::{DateTime, Duration, Utc};

/// An ordered, non-empty run of same-source intervals
#[derive(Debug, Clone, PartialEq)]
pub struct SleepSession {
    intervals: Vec<SleepInterval>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl SleepSession {
    fn new(first: SleepInterval) -> Self {
        Self {
            start: first.start,
            end: first.end,
            intervals: vec![first],
        }
    }

    fn push(&mut self, interval: SleepInterval) {
        self.start = self.start.min(interval.start);
        self.end = self.end.max(interval.end);
        self.intervals.push(interval);
    }

    /// Member intervals in ascending start order
    pub fn intervals(&self) -> &[SleepInterval] {
        &self.intervals
    }

    /// Earliest member start
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Latest member end
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

/// Split one source's intervals into sessions
///
/// Input order does not matter; intervals are sorted by start (then end)
/// first. A gap of exactly `gap_threshold` keeps intervals together, only a
/// strictly larger gap opens a new session.
pub fn group_sessions(intervals: &[SleepInterval], gap_threshold: Duration) -> Vec<SleepSession> {
    let mut sorted = intervals.to_vec();
    sorted.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));

    let mut sessions = Vec::new();
    let mut iter = sorted.into_iter();
    let Some(first) = iter.next() else {
        return sessions;
    };

    let mut current = SleepSession::new(first);
    for interval in iter {
        let gap = interval.start - current.end;
        if gap > gap_threshold {
            sessions.push(std::mem::replace(&mut current, SleepSession::new(interval)));
        } else {
            current.push(interval);
        }
    }
    sessions.push(current);

    sessions
}
