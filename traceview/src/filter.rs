//! Pure predicate filtering over a flat event collection.

use bon::Builder;
use serde::{Deserialize, Serialize};
use trace_format::TraceEvent;

/// Conjunctive filter criteria.
///
/// An absent field imposes no constraint, and so does an *empty* list in any
/// of the list-valued fields; `FilterCriteria::default()` is therefore the
/// identity filter. `time_range` is inclusive on both ends and tests `ts`
/// only: an event starting inside the range but extending past its end still
/// passes. `search_term` is a case-insensitive substring match on `name`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    /// Raw phase codes ("B", "X", ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_types: Option<Vec<String>>,
    /// Minimum duration in microseconds; a missing `dur` counts as zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_duration: Option<f64>,
    /// Inclusive `[start, end]` window on `ts`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
}

impl FilterCriteria {
    /// Whether `event` satisfies every constraint present in the criteria.
    pub fn matches(&self, event: &TraceEvent) -> bool {
        if let Some(pids) = &self.process_ids {
            if !pids.is_empty() && !event.pid.is_some_and(|pid| pids.contains(&pid)) {
                return false;
            }
        }
        if let Some(tids) = &self.thread_ids {
            if !tids.is_empty() && !event.tid.is_some_and(|tid| tids.contains(&tid)) {
                return false;
            }
        }
        if let Some(categories) = &self.categories {
            if !categories.is_empty() && !categories.contains(&event.cat) {
                return false;
            }
        }
        if let Some(types) = &self.event_types {
            if !types.is_empty() && !types.contains(&event.ph) {
                return false;
            }
        }
        let dur = event.dur.unwrap_or(0.0);
        if let Some(min) = self.min_duration {
            if dur < min {
                return false;
            }
        }
        if let Some(max) = self.max_duration {
            if dur > max {
                return false;
            }
        }
        if let Some((start, end)) = self.time_range {
            if event.ts < start || event.ts > end {
                return false;
            }
        }
        if let Some(term) = &self.search_term {
            if !term.is_empty()
                && !event
                    .name
                    .to_lowercase()
                    .contains(&term.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

/// Filters `events` against `criteria`, preserving input order.
pub fn filter_events(events: &[TraceEvent], criteria: &FilterCriteria) -> Vec<TraceEvent> {
    events
        .iter()
        .filter(|event| criteria.matches(event))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    fn event(pid: i64, tid: i64, ts: f64, dur: Option<f64>, ph: &str, name: &str, cat: &str) -> TraceEvent {
        TraceEvent {
            pid: Some(pid),
            tid: Some(tid),
            ts,
            dur,
            ph: ph.to_string(),
            name: name.to_string(),
            cat: cat.to_string(),
            args: None,
            id: None,
            sf: None,
            stack: None,
            scope: None,
        }
    }

    #[fixture]
    fn events() -> Vec<TraceEvent> {
        vec![
            event(1, 10, 0.0, Some(100.0), "X", "ParseHTML", "blink"),
            event(1, 11, 50.0, Some(10.0), "X", "V8.Execute", "v8"),
            event(2, 20, 120.0, None, "I", "FrameMark", "gpu"),
            event(2, 20, 150.0, Some(500.0), "X", "Rasterize", "gpu"),
        ]
    }

    #[rstest]
    fn test_empty_criteria_is_identity(events: Vec<TraceEvent>) {
        let filtered = filter_events(&events, &FilterCriteria::default());
        assert_eq!(filtered, events);
    }

    #[rstest]
    fn test_empty_lists_impose_no_constraint(events: Vec<TraceEvent>) {
        let criteria = FilterCriteria::builder()
            .process_ids(vec![])
            .categories(vec![])
            .event_types(vec![])
            .build();
        assert_eq!(filter_events(&events, &criteria), events);
    }

    #[rstest]
    fn test_process_and_thread_ids(events: Vec<TraceEvent>) {
        let criteria = FilterCriteria::builder().process_ids(vec![1]).build();
        let filtered = filter_events(&events, &criteria);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|e| e.pid == Some(1)));

        let criteria = FilterCriteria::builder()
            .process_ids(vec![1])
            .thread_ids(vec![11])
            .build();
        let filtered = filter_events(&events, &criteria);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "V8.Execute");
    }

    #[rstest]
    fn test_duration_bounds_missing_dur_is_zero(events: Vec<TraceEvent>) {
        let criteria = FilterCriteria::builder().min_duration(1.0).build();
        let filtered = filter_events(&events, &criteria);
        // the instant event has no duration and fails min_duration
        assert_eq!(filtered.len(), 3);

        let criteria = FilterCriteria::builder().max_duration(0.0).build();
        let filtered = filter_events(&events, &criteria);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "FrameMark");
    }

    #[rstest]
    fn test_time_range_inclusive_on_ts_only(events: Vec<TraceEvent>) {
        let criteria = FilterCriteria::builder().time_range((50.0, 150.0)).build();
        let filtered = filter_events(&events, &criteria);
        // Rasterize starts at 150 and extends to 650; it still passes
        assert_eq!(filtered.len(), 3);
        assert_eq!(filtered[2].name, "Rasterize");
    }

    #[rstest]
    fn test_search_term_case_insensitive(events: Vec<TraceEvent>) {
        let criteria = FilterCriteria::builder()
            .search_term("v8.exec".to_string())
            .build();
        let filtered = filter_events(&events, &criteria);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "V8.Execute");

        let criteria = FilterCriteria::builder().search_term(String::new()).build();
        assert_eq!(filter_events(&events, &criteria), events);
    }

    #[rstest]
    fn test_conjunction_all_constraints_hold(events: Vec<TraceEvent>) {
        let criteria = FilterCriteria::builder()
            .process_ids(vec![2])
            .event_types(vec!["X".to_string()])
            .min_duration(100.0)
            .time_range((0.0, 1000.0))
            .build();

        for event in filter_events(&events, &criteria) {
            assert_eq!(event.pid, Some(2));
            assert_eq!(event.ph, "X");
            assert!(event.dur.unwrap_or(0.0) >= 100.0);
            assert!(event.ts >= 0.0 && event.ts <= 1000.0);
        }
    }

    #[rstest]
    fn test_order_preserved(events: Vec<TraceEvent>) {
        let criteria = FilterCriteria::builder()
            .categories(vec!["gpu".to_string(), "blink".to_string()])
            .build();
        let filtered = filter_events(&events, &criteria);
        let names: Vec<&str> = filtered.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["ParseHTML", "FrameMark", "Rasterize"]);
    }

    #[rstest]
    fn test_criteria_from_toml() {
        let criteria: FilterCriteria = toml::from_str(
            r#"
            processIds = [1, 2]
            minDuration = 10.0
            timeRange = [0.0, 500.0]
            searchTerm = "parse"
            "#,
        )
        .unwrap();
        assert_eq!(criteria.process_ids, Some(vec![1, 2]));
        assert_eq!(criteria.time_range, Some((0.0, 500.0)));
    }
}
