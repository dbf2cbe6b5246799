//! Analysis export: filtered events, statistics, active filters, and trace
//! metadata serialized together as one JSON document.

use crate::{FilterCriteria, Statistics, TraceError, TraceMetadata};
use serde::Serialize;
use std::io::Write;
use trace_format::TraceEvent;

/// The export payload. Every field is independently JSON-serializable; no
/// layout scratch state leaks into it.
#[derive(Debug, Serialize)]
pub struct AnalysisExport<'a> {
    pub events: &'a [TraceEvent],
    pub statistics: &'a Statistics,
    pub filters: &'a FilterCriteria,
    pub metadata: &'a TraceMetadata,
}

/// Writes the export payload as pretty-printed JSON.
pub fn write_analysis<W: Write>(writer: W, export: &AnalysisExport<'_>) -> Result<(), TraceError> {
    serde_json::to_writer_pretty(writer, export)?;
    Ok(())
}
