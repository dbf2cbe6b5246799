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

//! Flame graph construction and layout.
//!
//! A flame tree is derived from complete (`ph == "X"`) events by temporal
//! containment, using a single pass over the ts-sorted events and an explicit
//! stack of open nodes. The pass is an approximation that assumes properly
//! nested traces: an event that overlaps the current top but crosses its end
//! is demoted to a root rather than merged or rejected. Malformed traces get
//! that documented behavior, not interval-tree reconstruction.

use serde::Serialize;
use trace_format::{Phase, TraceEvent};

/// Cap on a single flame row's height in pixels.
pub const MAX_ROW_HEIGHT: f64 = 25.0;

/// One node of the flame tree.
///
/// Owns its children exclusively; a node appears in exactly one parent's
/// child list or as a root. `x`/`width` are pixel-space and only valid after
/// a [`layout`] pass over the same node set.
#[derive(Debug, Clone, Serialize)]
pub struct FlameNode {
    pub event: TraceEvent,
    pub children: Vec<FlameNode>,
    /// Root nodes are at depth 0.
    pub depth: usize,
    pub x: f64,
    pub width: f64,
}

struct Slot {
    event: TraceEvent,
    depth: usize,
    children: Vec<usize>,
}

/// Builds the flame forest from `events`.
///
/// Only complete events with a strictly positive duration participate; they
/// are sorted ascending by `ts` (stable) before the containment pass. For
/// each event the stack is popped while the top has fully ended at or before
/// the event's start; the event becomes a child of the remaining top if that
/// top fully contains its interval, otherwise a root. The new node is pushed
/// unconditionally so it can parent later events.
pub fn build_tree(events: &[TraceEvent]) -> Vec<FlameNode> {
    let mut complete: Vec<&TraceEvent> = events
        .iter()
        .filter(|e| e.phase() == Phase::Complete && e.dur.is_some_and(|d| d > 0.0))
        .collect();
    complete.sort_by(|a, b| a.ts.total_cmp(&b.ts));

    let mut slots: Vec<Slot> = Vec::with_capacity(complete.len());
    let mut roots: Vec<usize> = Vec::new();
    let mut stack: Vec<usize> = Vec::new();

    for event in complete {
        while let Some(&top) = stack.last() {
            if slots[top].event.end_ts() <= event.ts {
                stack.pop();
            } else {
                break;
            }
        }

        let index = slots.len();
        let parent = stack.last().copied().filter(|&top| {
            slots[top].event.ts <= event.ts && event.end_ts() <= slots[top].event.end_ts()
        });
        let depth = match parent {
            Some(top) => slots[top].depth + 1,
            None => 0,
        };

        slots.push(Slot {
            event: event.clone(),
            depth,
            children: Vec::new(),
        });
        match parent {
            Some(top) => slots[top].children.push(index),
            None => roots.push(index),
        }
        stack.push(index);
    }

    // children always carry a larger index than their parent, so popping the
    // arena back-to-front has every child built before its parent needs it
    let mut built: Vec<Option<FlameNode>> = (0..slots.len()).map(|_| None).collect();
    while let Some(slot) = slots.pop() {
        let index = slots.len();
        let children: Vec<FlameNode> = slot
            .children
            .iter()
            .filter_map(|&child| built[child].take())
            .collect();
        built[index] = Some(FlameNode {
            event: slot.event,
            children,
            depth: slot.depth,
            x: 0.0,
            width: 0.0,
        });
    }

    roots
        .into_iter()
        .filter_map(|root| built[root].take())
        .collect()
}

/// Computes pixel-space `x`/`width` for every node, recursively.
///
/// `width` is floored at one pixel so zero-width-looking bars stay visible
/// and clickable.
pub fn layout(nodes: &mut [FlameNode], total_width: f64, start_time: f64, end_time: f64) {
    let time_range = end_time - start_time;
    for node in nodes {
        node.x = (node.event.ts - start_time) / time_range * total_width;
        node.width = (node.event.dur.unwrap_or(0.0) / time_range * total_width).max(1.0);
        layout(&mut node.children, total_width, start_time, end_time);
    }
}

/// Largest depth present in the forest; 0 for an empty forest.
pub fn max_depth(nodes: &[FlameNode]) -> usize {
    nodes
        .iter()
        .map(|node| node.depth.max(max_depth(&node.children)))
        .max()
        .unwrap_or(0)
}

/// Vertical row geometry shared by every node of one rendered forest.
///
/// Rows stack bottom-up: depth 0 sits at the bottom of the available height
/// and deeper frames stack upward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RowGeometry {
    pub row_height: f64,
    pub available_height: f64,
}

impl RowGeometry {
    pub fn new(roots: &[FlameNode], available_height: f64) -> RowGeometry {
        let rows = max_depth(roots) + 2;
        RowGeometry {
            row_height: MAX_ROW_HEIGHT.min(available_height / rows as f64),
            available_height,
        }
    }

    /// Top y coordinate of the row for `depth`.
    pub fn row_top(&self, depth: usize) -> f64 {
        self.available_height - (depth as f64 + 1.0) * self.row_height
    }
}

/// Finds the event whose laid-out rectangle contains `(x, y)`.
///
/// Pre-order depth-first: a node is tested before its children, so when the
/// containment edge case produces overlapping rectangles the shallower node
/// wins. Requires a prior [`layout`] pass over `roots`.
pub fn hit_test<'a>(
    roots: &'a [FlameNode],
    geometry: &RowGeometry,
    x: f64,
    y: f64,
) -> Option<&'a TraceEvent> {
    for node in roots {
        let top = geometry.row_top(node.depth);
        if x >= node.x
            && x <= node.x + node.width
            && y >= top
            && y <= top + geometry.row_height - 1.0
        {
            return Some(&node.event);
        }
        if let Some(event) = hit_test(&node.children, geometry, x, y) {
            return Some(event);
        }
    }
    None
}
