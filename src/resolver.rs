//! Per-day source selection
//!
//! When several devices report the same night, exactly one priority group
//! wins each calendar day and every other group's hours for that day are
//! discarded. Hours are never averaged or blended across groups.

use crate::aggregation_types::DailySleep;
use crate::config::SourcePriorityTable;
use crate::timeseries::round_to;
use crate::types::{DailyDate, SourceName};
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

/// A main-sleep session ready for per-day resolution
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedSession {
    /// Local calendar day of the session end
    pub date: DailyDate,
    pub source: SourceName,
    pub hours: f64,
}

#[derive(Default)]
struct PriorityGroup {
    hours: f64,
    sources: BTreeSet<String>,
}

/// Picks the best-priority source group for each day
#[derive(Debug, Clone, Default)]
pub struct SourceResolver {
    priorities: SourcePriorityTable,
}

impl SourceResolver {
    pub fn new(priorities: SourcePriorityTable) -> Self {
        Self { priorities }
    }

    /// Resolve sessions into one record per day, sorted by date
    ///
    /// Sessions sharing a `(date, priority)` are summed, including sessions
    /// from different sources that happen to share a priority. Hours are
    /// rounded to 2 decimals.
    pub fn resolve(
        &self,
        sessions: impl IntoIterator<Item = QualifiedSession>,
    ) -> Vec<DailySleep> {
        let mut days: BTreeMap<DailyDate, BTreeMap<u8, PriorityGroup>> = BTreeMap::new();

        for session in sessions {
            let priority = self.priorities.priority_of(session.source.as_str());
            let group = days
                .entry(session.date)
                .or_default()
                .entry(priority)
                .or_default();
            group.hours += session.hours;
            group.sources.insert(session.source.to_string());
        }

        days.into_iter()
            .filter_map(|(date, mut groups)| {
                let (priority, group) = groups.pop_first()?;
                if !groups.is_empty() {
                    trace!(
                        %date,
                        priority,
                        discarded = groups.len(),
                        "Discarding lower-priority sources"
                    );
                }
                Some(DailySleep {
                    date,
                    hours: round_to(group.hours, 2),
                    priority,
                    sources: group.sources.into_iter().collect(),
                })
            })
            .collect()
    }

    /// Resolve sessions into a `date -> hours` map
    pub fn resolve_map(
        &self,
        sessions: impl IntoIterator<Item = QualifiedSession>,
    ) -> BTreeMap<DailyDate, f64> {
        self.resolve(sessions)
            .into_iter()
            .map(|day| (day.date, day.hours))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> DailyDate {
        DailyDate::new(NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
    }

    fn qualified(d: u32, source: &str, hours: f64) -> QualifiedSession {
        QualifiedSession {
            date: day(d),
            source: SourceName::new(source),
            hours,
        }
    }

    #[test]
    fn test_oura_wins_over_other_source() {
        let resolver = SourceResolver::default();
        let result = resolver.resolve(vec![
            qualified(2, "iPhone", 7.5),
            qualified(2, "Oura", 6.0),
        ]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].hours, 6.0);
        assert_eq!(result[0].priority, 1);
        assert_eq!(result[0].sources, vec!["Oura".to_string()]);
    }

    #[test]
    fn test_eight_sleep_beats_default_but_not_oura() {
        let resolver = SourceResolver::default();
        let map = resolver.resolve_map(vec![
            qualified(2, "Eight Sleep", 7.0),
            qualified(2, "Apple Watch", 8.0),
            qualified(3, "Eight Sleep", 6.5),
            qualified(3, "OURA", 6.25),
        ]);
        assert_eq!(map[&day(2)], 7.0);
        assert_eq!(map[&day(3)], 6.25);
    }

    #[test]
    fn test_same_priority_sessions_are_summed() {
        let resolver = SourceResolver::default();
        let result = resolver.resolve(vec![
            qualified(2, "Oura", 1.25),
            qualified(2, "Oura", 5.5),
            qualified(2, "Apple Watch", 2.0),
            qualified(2, "iPhone", 3.0),
        ]);
        assert_eq!(result[0].hours, 6.75);

        let fallback = resolver.resolve(vec![
            qualified(4, "Apple Watch", 2.0),
            qualified(4, "iPhone", 3.0),
        ]);
        assert_eq!(fallback[0].hours, 5.0);
        assert_eq!(
            fallback[0].sources,
            vec!["Apple Watch".to_string(), "iPhone".to_string()]
        );
    }

    #[test]
    fn test_days_resolved_independently_and_sorted() {
        let resolver = SourceResolver::default();
        let result = resolver.resolve(vec![
            qualified(5, "Apple Watch", 7.0),
            qualified(3, "Oura", 6.0),
        ]);
        let dates: Vec<_> = result.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![day(3), day(5)]);
        assert_eq!(result[1].hours, 7.0);
    }

    #[test]
    fn test_hours_rounded_to_two_decimals() {
        let resolver = SourceResolver::default();
        let result = resolver.resolve(vec![qualified(2, "Oura", 7.0 + 1.0 / 3.0)]);
        assert_eq!(result[0].hours, 7.33);
    }

    #[test]
    fn test_empty_input() {
        assert!(SourceResolver::default().resolve(Vec::new()).is_empty());
    }
}
