//! Aggregate statistics over a flat event collection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use trace_format::TraceEvent;

/// Aggregate metrics for one event collection.
///
/// `average_duration` is the mean over events that carry a duration;
/// the distributions count every input event regardless of `dur`, so each
/// distribution's values sum to `total_events`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_events: usize,
    pub average_duration: f64,
    pub longest_event: Option<TraceEvent>,
    pub shortest_event: Option<TraceEvent>,
    pub category_distribution: BTreeMap<String, usize>,
    pub phase_distribution: BTreeMap<String, usize>,
    /// Counts keyed by pid; events that could not be attributed to a process
    /// are counted under -1.
    pub process_distribution: BTreeMap<i64, usize>,
}

/// Computes [`Statistics`] over `events`.
///
/// Total over any input: an empty collection yields the all-zero result with
/// no longest/shortest event and empty distributions.
///
/// Tie-breaks are first-encountered-wins under a left fold: `longest_event`
/// maximizes `dur` with a missing duration counting as zero, `shortest_event`
/// minimizes `dur` with a missing duration counting as +inf, so an event
/// without a duration is only ever "shortest" when no event has one (in which
/// case the first event wins).
pub fn calculate_statistics(events: &[TraceEvent]) -> Statistics {
    if events.is_empty() {
        return Statistics::default();
    }

    let mut duration_sum = 0.0;
    let mut duration_count = 0usize;
    let mut longest = 0usize;
    let mut shortest = 0usize;
    let mut category_distribution = BTreeMap::new();
    let mut phase_distribution = BTreeMap::new();
    let mut process_distribution = BTreeMap::new();

    for (index, event) in events.iter().enumerate() {
        if let Some(dur) = event.dur {
            duration_sum += dur;
            duration_count += 1;
        }
        if event.dur.unwrap_or(0.0) > events[longest].dur.unwrap_or(0.0) {
            longest = index;
        }
        if event.dur.unwrap_or(f64::INFINITY) < events[shortest].dur.unwrap_or(f64::INFINITY) {
            shortest = index;
        }

        *category_distribution.entry(event.cat.clone()).or_insert(0) += 1;
        *phase_distribution.entry(event.ph.clone()).or_insert(0) += 1;
        *process_distribution.entry(event.pid.unwrap_or(-1)).or_insert(0) += 1;
    }

    Statistics {
        total_events: events.len(),
        average_duration: if duration_count > 0 {
            duration_sum / duration_count as f64
        } else {
            0.0
        },
        longest_event: Some(events[longest].clone()),
        shortest_event: Some(events[shortest].clone()),
        category_distribution,
        phase_distribution,
        process_distribution,
    }
}
