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

//! # Trace Format
//!
//! Rust types for the subset of the Chrome Trace Event Format consumed by the
//! traceview analysis crates.
//!
//! The Chrome Trace Event Format is a JSON-based format for recording
//! performance traces. Traces can be provided in two formats:
//! - **JSON Array Format**: a plain array of trace events
//! - **JSON Object Format**: an object with a `traceEvents` array plus metadata
//!
//! Unlike a trace *producer*, an analyzer has to accept whatever a tracing
//! tool actually emitted. Traces in the wild carry `pid`/`tid`/`ts`/`dur`
//! either as JSON numbers or as numeric strings, omit `ph`/`name`/`cat`
//! entirely, and attach free-form payloads under `args`. Deserialization here
//! is therefore tolerant: numeric fields accept both encodings, string fields
//! default to empty, and `args`/`stack` stay opaque [`Value`]s. A record that
//! cannot be attributed to a process/thread still deserializes; downstream
//! grouping decides what to do with it.
//!
//! All timestamps are in microseconds.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A whole trace document, in either of the two accepted formats.
///
/// The object format carries extra top-level properties the analyzer does not
/// interpret; only `traceEvents` and the display/metadata fields that survive
/// re-serialization are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraceDocument {
    /// JSON Array Format: the document is the event array itself.
    Array(Vec<TraceEvent>),
    /// JSON Object Format: events live under `traceEvents`.
    Object {
        #[serde(rename = "traceEvents")]
        trace_events: Vec<TraceEvent>,
        /// Unit for displaying timestamps ("ms" or "ns"), informational only.
        #[serde(rename = "displayTimeUnit", skip_serializing_if = "Option::is_none")]
        display_time_unit: Option<String>,
        /// Free-form trace metadata, passed through untouched.
        #[serde(skip_serializing_if = "Option::is_none")]
        metadata: Option<Value>,
    },
}

impl TraceDocument {
    /// Extracts the flat event array regardless of document format.
    pub fn into_events(self) -> Vec<TraceEvent> {
        match self {
            TraceDocument::Array(events) => events,
            TraceDocument::Object { trace_events, .. } => trace_events,
        }
    }
}

/// A single flat trace event record.
///
/// Every field except `ts` is optional in practice; `ts` defaults to zero when
/// absent so that malformed records still deserialize. Events are immutable
/// once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Process ID. Absent or unparseable values deserialize as `None`; such
    /// events cannot be attributed to a process track.
    #[serde(
        default,
        deserialize_with = "lenient_opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub pid: Option<i64>,
    /// Thread ID, with the same leniency as `pid`.
    #[serde(
        default,
        deserialize_with = "lenient_opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub tid: Option<i64>,
    /// Start timestamp in microseconds.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub ts: f64,
    /// Duration in microseconds. Absent for instant events and other phases
    /// that carry no duration.
    #[serde(
        default,
        deserialize_with = "lenient_opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub dur: Option<f64>,
    /// Single-character phase code (see [`Phase`]). Empty when absent.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ph: String,
    /// Display name of the event. Empty when absent.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Comma-separated list of categories. Empty when absent.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cat: String,
    /// Custom arguments. Opaque to the analyzer beyond `args.name`, which
    /// seeds process/thread display names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,
    /// Event identifier for correlating related events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    /// Stack frame ID referencing a stack frame dictionary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sf: Option<u64>,
    /// Inline stack trace, opaque frames passed through for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<Vec<Value>>,
    /// Scope string for ID disambiguation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl TraceEvent {
    /// Classification of the raw phase code.
    pub fn phase(&self) -> Phase {
        Phase::from_code(&self.ph)
    }

    /// End timestamp: `ts + dur`, with a missing duration treated as zero.
    pub fn end_ts(&self) -> f64 {
        self.ts + self.dur.unwrap_or(0.0)
    }

    /// The `args.name` string, when present. Used to derive process and
    /// thread display names at first sight.
    pub fn args_name(&self) -> Option<&str> {
        self.args
            .as_ref()
            .and_then(|args| args.get("name"))
            .and_then(Value::as_str)
    }
}

/// Recognized event phase classes.
///
/// The raw `ph` field stays a free string on [`TraceEvent`] (filters match on
/// the literal code); this enum is the semantic classification the analysis
/// layers branch on. Codes outside the recognized set map to [`Phase::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Begin phase of a duration event (B).
    Begin,
    /// End phase of a duration event (E).
    End,
    /// Complete event carrying both start time and duration (X).
    Complete,
    /// Instant event with no duration (I, or the lowercase i variant).
    Instant,
    /// Sampling profiler sample (P).
    Sample,
    /// Counter value event (C).
    Counter,
    /// Process/thread metadata event (M).
    Metadata,
    /// Object creation (N).
    ObjectCreated,
    /// Object destruction (D).
    ObjectDestroyed,
    /// Object snapshot (O).
    ObjectSnapshot,
    /// Any unrecognized or absent phase code.
    Other,
}

impl Phase {
    pub fn from_code(code: &str) -> Phase {
        match code {
            "B" => Phase::Begin,
            "E" => Phase::End,
            "X" => Phase::Complete,
            "I" | "i" => Phase::Instant,
            "P" => Phase::Sample,
            "C" => Phase::Counter,
            "M" => Phase::Metadata,
            "N" => Phase::ObjectCreated,
            "D" => Phase::ObjectDestroyed,
            "O" => Phase::ObjectSnapshot,
            _ => Phase::Other,
        }
    }
}

/// Event identifier that can be a string or a number.
///
/// IDs correlate related events. Memory addresses are conventionally hex
/// strings like "0x1000".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    String(String),
    Number(u64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl LenientNumber {
    fn as_i64(&self) -> Option<i64> {
        match self {
            LenientNumber::Int(n) => Some(*n),
            LenientNumber::Float(f) => Some(*f as i64),
            LenientNumber::Text(s) => s.trim().parse().ok(),
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            LenientNumber::Int(n) => Some(*n as f64),
            LenientNumber::Float(f) => Some(*f),
            LenientNumber::Text(s) => s.trim().parse().ok(),
        }
    }
}

fn lenient_opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<LenientNumber>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_i64()))
}

fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<LenientNumber>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()))
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<LenientNumber>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()).unwrap_or(0.0))
}
