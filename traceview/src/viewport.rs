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

//! Viewport coordinate transforms and track hit-testing.
//!
//! The viewport is the visible `[start, end]` time sub-range of the trace,
//! in the same microsecond unit as event timestamps. Pan and zoom are pure
//! transforms returning a new viewport. Neither clamps to the data's global
//! bounds, and repeated zoom-in has no minimum-range floor; both are
//! documented behavior of the observed design, preserved rather than patched.

use serde::{Deserialize, Serialize};
use trace_format::TraceEvent;

/// Zoom factor applied per zoom-in step.
pub const ZOOM_IN_FACTOR: f64 = 0.9;
/// Zoom factor applied per zoom-out step.
pub const ZOOM_OUT_FACTOR: f64 = 1.1;

/// Height of one `(pid, tid)` track row in pixels.
pub const TRACK_HEIGHT: f64 = 40.0;
/// Vertical gap between track rows in pixels.
pub const TRACK_SPACING: f64 = 5.0;
/// Y offset of the first track row, below the time ruler.
pub const TRACK_TOP_OFFSET: f64 = 30.0;
/// Pixel width credited to an event with no duration during hit-testing.
pub const INSTANT_WIDTH_PX: f64 = 2.0;

/// Visible time range over the trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub start: f64,
    pub end: f64,
}

impl Viewport {
    pub fn new(start: f64, end: f64) -> Viewport {
        Viewport { start, end }
    }

    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    /// Time coordinate under pixel `x` of a container `width` pixels wide.
    pub fn time_at(&self, x: f64, width: f64) -> f64 {
        self.start + x / width * self.span()
    }

    /// Pans by a pointer drag of `pixel_delta_x`.
    ///
    /// Dragging right moves the window backward in time, so the content
    /// follows the pointer. The result may extend arbitrarily far outside
    /// the data.
    pub fn pan(&self, pixel_delta_x: f64, width: f64) -> Viewport {
        let time_delta = pixel_delta_x / width * self.span();
        Viewport {
            start: self.start - time_delta,
            end: self.end - time_delta,
        }
    }

    /// Zooms about the time value under `cursor_x`, which stays invariant.
    pub fn zoom_at_cursor(&self, cursor_x: f64, width: f64, zoom_out: bool) -> Viewport {
        let cursor_time = self.time_at(cursor_x, width);
        let factor = if zoom_out {
            ZOOM_OUT_FACTOR
        } else {
            ZOOM_IN_FACTOR
        };
        let start = cursor_time - (cursor_time - self.start) * factor;
        Viewport {
            start,
            end: start + self.span() * factor,
        }
    }

    /// Events starting inside the range, inclusive on both ends.
    pub fn visible_slice(&self, events: &[TraceEvent]) -> Vec<TraceEvent> {
        events
            .iter()
            .filter(|e| e.ts >= self.start && e.ts <= self.end)
            .cloned()
            .collect()
    }
}

/// Time-ruler tick step for a viewport `span`: the largest power of ten that
/// fits roughly ten ticks across the range.
pub fn tick_step(span: f64) -> f64 {
    10f64.powf((span / 10.0).log10().floor())
}

/// Finds the event under pixel `(x, y)` on the per-thread track view.
///
/// Events are grouped by `(pid, tid)` in first-seen order; each group gets a
/// fixed-height row in that order. Within the row mapped from `y`, the first
/// event (in group order) whose time interval contains the cursor's time
/// coordinate wins. Events with no duration are credited an
/// [`INSTANT_WIDTH_PX`]-equivalent interval so they stay clickable.
pub fn hit_test_track<'a>(
    events: &'a [TraceEvent],
    x: f64,
    y: f64,
    viewport: &Viewport,
    width: f64,
) -> Option<&'a TraceEvent> {
    let cursor_time = viewport.time_at(x, width);
    let instant_span = INSTANT_WIDTH_PX / width * viewport.span();

    let mut tracks: Vec<(Option<i64>, Option<i64>)> = Vec::new();
    for event in events {
        let key = (event.pid, event.tid);
        if !tracks.contains(&key) {
            tracks.push(key);
        }
    }

    let row = y - TRACK_TOP_OFFSET;
    if row < 0.0 {
        return None;
    }
    let index = (row / (TRACK_HEIGHT + TRACK_SPACING)) as usize;
    if index >= tracks.len() || row % (TRACK_HEIGHT + TRACK_SPACING) >= TRACK_HEIGHT {
        return None;
    }
    let key = tracks[index];

    events
        .iter()
        .filter(|e| (e.pid, e.tid) == key)
        .find(|e| {
            let end = e.ts + e.dur.unwrap_or(instant_span);
            cursor_time >= e.ts && cursor_time <= end
        })
}
