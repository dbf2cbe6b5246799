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

//! # traceview
//!
//! Analysis core for Chrome Trace Event Format traces: ingestion into a
//! process/thread hierarchy, predicate filtering, aggregate statistics, flame
//! graph construction with pixel-space layout and hit-testing, and viewport
//! pan/zoom math.
//!
//! Everything here is a pure, synchronous function of immutable inputs.
//! Ingestion runs once per loaded document; the derived collections (filtered
//! events, statistics, flame forest, visible slice) recompute deterministically
//! from `(TraceData, FilterCriteria, Viewport)` and can be memoized by input
//! identity by whatever scheduler drives them. Rendering, widgets, and file
//! pickers are consumers of these outputs, not part of this crate.

use thiserror::Error;

pub mod color;
pub mod config;
pub mod export;
pub mod filter;
pub mod flame;
pub mod ingest;
pub mod stats;
pub mod viewport;

pub use color::{category_color, phase_color};
pub use export::{write_analysis, AnalysisExport};
pub use filter::{filter_events, FilterCriteria};
pub use flame::{build_tree, hit_test, layout, max_depth, FlameNode, RowGeometry};
pub use ingest::{ProcessInfo, ThreadInfo, TraceData, TraceMetadata};
pub use stats::{calculate_statistics, Statistics};
pub use viewport::{hit_test_track, tick_step, Viewport};

/// Failures surfaced while loading a trace document.
///
/// Ingestion is all-or-nothing: on error no partial [`TraceData`] is
/// produced. Per-record problems (missing `pid`/`tid`) are not errors; those
/// records are skipped from grouping and only counted in the metadata.
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("invalid trace document: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("failed to read trace: {0}")]
    Io(#[from] std::io::Error),
}
