//! Exact-duplicate removal for raw sleep intervals
//!
//! Devices and sync layers regularly deliver the same interval more than once
//! (re-syncs, overlapping exports, retried uploads). Two intervals are the
//! same record iff `(start, end, stage, source)` match; the record id is
//! ignored because re-exports frequently mint a fresh one.

use crate::types::{SleepInterval, SleepStage, SourceName};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::debug;

type DedupKey = (DateTime<Utc>, DateTime<Utc>, SleepStage, SourceName);

fn dedup_key(interval: &SleepInterval) -> DedupKey {
    (
        interval.start,
        interval.end,
        interval.stage,
        interval.source.clone(),
    )
}

/// Remove exact duplicates, keeping the first occurrence of each
///
/// The relative order of the surviving intervals is the input order.
pub fn deduplicate(intervals: Vec<SleepInterval>) -> Vec<SleepInterval> {
    let before = intervals.len();
    let mut seen: HashSet<DedupKey> = HashSet::with_capacity(before);
    let unique: Vec<SleepInterval> = intervals
        .into_iter()
        .filter(|interval| seen.insert(dedup_key(interval)))
        .collect();

    if unique.len() < before {
        debug!(
            removed = before - unique.len(),
            remaining = unique.len(),
            "Removed duplicate sleep intervals"
        );
    }
    unique
}
