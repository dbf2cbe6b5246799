// Copyright (C) 2025 Category Labs, Inc.
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Trace ingestion: normalizes a flat event array into the
//! process/thread hierarchy and computes global time bounds.

use crate::TraceError;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use trace_format::{TraceDocument, TraceEvent};

/// One thread's worth of events, sorted ascending by `ts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadInfo {
    pub tid: i64,
    /// Display name, from `args.name` of the first event seen on this thread,
    /// else `Thread {tid}`. Later events never rename an existing thread.
    pub name: String,
    pub events: Vec<TraceEvent>,
}

/// A process and its threads, in order of first occurrence in the input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: i64,
    pub name: String,
    pub threads: Vec<ThreadInfo>,
}

/// Global bounds over all grouped events.
///
/// With zero groupable events `start_time`/`end_time` stay at their +inf/-inf
/// sentinels and `total_duration` is degenerate; callers must check
/// `event_count == 0` (or the process list) before trusting the range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceMetadata {
    pub total_duration: f64,
    pub start_time: f64,
    pub end_time: f64,
    /// Total input length, including records skipped from grouping.
    pub event_count: usize,
}

/// The full normalized trace. Built once per loaded document, immutable
/// afterwards; all analysis functions derive from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceData {
    pub processes: Vec<ProcessInfo>,
    pub metadata: TraceMetadata,
}

impl TraceData {
    /// Groups a raw event array by process and thread.
    ///
    /// Records missing either `pid` or `tid` are excluded from grouping but
    /// still counted in `metadata.event_count`. This never fails: a trace
    /// where every record is skipped produces an empty process list with
    /// sentinel time bounds.
    pub fn parse(raw: Vec<TraceEvent>) -> TraceData {
        let event_count = raw.len();
        let mut start_time = f64::INFINITY;
        let mut end_time = f64::NEG_INFINITY;
        let mut processes: Vec<ProcessInfo> = Vec::new();
        let mut skipped = 0usize;

        for event in raw {
            let (Some(pid), Some(tid)) = (event.pid, event.tid) else {
                skipped += 1;
                continue;
            };

            start_time = start_time.min(event.ts);
            end_time = end_time.max(event.end_ts());

            let process_index = match processes.iter().position(|p| p.pid == pid) {
                Some(index) => index,
                None => {
                    processes.push(ProcessInfo {
                        pid,
                        name: event
                            .args_name()
                            .map(str::to_string)
                            .unwrap_or_else(|| format!("Process {pid}")),
                        threads: Vec::new(),
                    });
                    processes.len() - 1
                }
            };
            let process = &mut processes[process_index];

            let thread_index = match process.threads.iter().position(|t| t.tid == tid) {
                Some(index) => index,
                None => {
                    process.threads.push(ThreadInfo {
                        tid,
                        name: event
                            .args_name()
                            .map(str::to_string)
                            .unwrap_or_else(|| format!("Thread {tid}")),
                        events: Vec::new(),
                    });
                    process.threads.len() - 1
                }
            };

            process.threads[thread_index].events.push(event);
        }

        for process in &mut processes {
            for thread in &mut process.threads {
                // stable: equal timestamps keep input order
                thread.events.sort_by(|a, b| a.ts.total_cmp(&b.ts));
            }
        }

        tracing::debug!(
            events = event_count,
            skipped,
            processes = processes.len(),
            "grouped trace events"
        );

        TraceData {
            processes,
            metadata: TraceMetadata {
                total_duration: end_time - start_time,
                start_time,
                end_time,
                event_count,
            },
        }
    }

    /// Parses a JSON trace document (array or object format) and ingests it.
    ///
    /// All-or-nothing: a document that is not valid JSON or not in either
    /// accepted shape yields an error and no partial data.
    pub fn parse_json(text: &str) -> Result<TraceData, TraceError> {
        let document: TraceDocument = serde_json::from_str(text)?;
        Ok(TraceData::parse(document.into_events()))
    }

    /// Reads a whole trace document from `reader` and ingests it.
    pub fn parse_reader(reader: impl Read) -> Result<TraceData, TraceError> {
        let document: TraceDocument = serde_json::from_reader(reader)?;
        Ok(TraceData::parse(document.into_events()))
    }

    /// Loads and ingests a trace file.
    pub fn parse_file(path: impl AsRef<Path>) -> Result<TraceData, TraceError> {
        let text = std::fs::read_to_string(path)?;
        TraceData::parse_json(&text)
    }

    /// Flattens the hierarchy back into one event list, process by process,
    /// thread by thread. This is the collection the filter and statistics
    /// layers operate on.
    pub fn all_events(&self) -> Vec<TraceEvent> {
        self.processes
            .iter()
            .flat_map(|p| p.threads.iter())
            .flat_map(|t| t.events.iter())
            .cloned()
            .collect()
    }
}
