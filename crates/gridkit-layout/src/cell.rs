//! Cell reconciliation.
//!
//! The axis partition hands every child a generous cell covering all of its
//! slots. Children rarely want all of it: the cell is trimmed on each axis,
//! first down to the child's maximum size and then down to its preferred size,
//! and the anchor decides which side loses the surplus.
//!
//! A child whose preferred size fills the cell's preferred extent is the one
//! the cell was sized for. It keeps the growth the slots received past their
//! preferred sizes instead of being trimmed back. Every other child is trimmed
//! to its own preferred size.

use crate::flex::{Axis, AxisHint};
use crate::{Rect, SizeHint};

/// Tolerance when comparing a child's preferred size to a cell's preferred
/// extent summed over several slots.
const EXTENT_EPSILON: f32 = 1e-3;

/// Edge a child is pinned to when its cell is larger than it wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Anchor {
    /// Surplus is removed evenly from both sides.
    #[default]
    Center,
    /// Hug the minimum edge (left/top); surplus comes off the maximum side.
    Min,
    /// Hug the maximum edge (right/bottom); surplus comes off the minimum side.
    Max,
}

impl Anchor {
    /// Build from independent edge flags. Both or neither means centered.
    pub fn from_flags(min: bool, max: bool) -> Self {
        match (min, max) {
            (true, false) => Anchor::Min,
            (false, true) => Anchor::Max,
            _ => Anchor::Center,
        }
    }
}

/// One axis of a generous cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSpan {
    /// Minimum edge coordinate.
    pub start: f32,
    /// Maximum edge coordinate.
    pub end: f32,
    /// Length the covered slots had before growing past their preferred sizes.
    pub preferred_extent: f32,
}

impl CellSpan {
    pub fn new(start: f32, end: f32, preferred_extent: f32) -> Self {
        Self {
            start,
            end,
            preferred_extent,
        }
    }

    pub fn size(&self) -> f32 {
        self.end - self.start
    }

    /// Growth past preferred sizes contained in this span.
    pub fn surplus(&self) -> f32 {
        (self.size() - self.preferred_extent).max(0.0)
    }

    /// Whether a child preferring `preferred` fills the preferred extent.
    pub fn sized_by(&self, preferred: f32) -> bool {
        preferred + EXTENT_EPSILON >= self.preferred_extent
    }
}

/// Trim `[start, end]` down to `bound`, removing surplus per `anchor`.
pub fn trim_span(start: f32, end: f32, bound: f32, anchor: Anchor) -> (f32, f32) {
    let size = end - start;
    if size <= bound {
        return (start, end);
    }

    let diff = size - bound;
    match anchor {
        Anchor::Center => (start + diff / 2.0, end - diff / 2.0),
        Anchor::Min => (start, end - diff),
        Anchor::Max => (start + diff, end),
    }
}

/// Reconcile one axis of a cell against a child's hint.
pub fn reconcile_axis(span: CellSpan, hint: AxisHint, anchor: Anchor) -> (f32, f32) {
    let (start, end) = trim_span(span.start, span.end, hint.max, anchor);
    let bound = if span.sized_by(hint.preferred) {
        hint.preferred + span.surplus()
    } else {
        hint.preferred
    };
    trim_span(start, end, bound, anchor)
}

/// A child's generous cell on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub horizontal: CellSpan,
    pub vertical: CellSpan,
}

impl Cell {
    pub fn new(horizontal: CellSpan, vertical: CellSpan) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// The untrimmed cell rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::from_edges(
            self.horizontal.start,
            self.vertical.start,
            self.horizontal.end,
            self.vertical.end,
        )
    }

    /// Trim the cell to the child's hint on both axes.
    pub fn reconcile(&self, hint: &SizeHint, anchor_x: Anchor, anchor_y: Anchor) -> Rect {
        let (min_x, max_x) = reconcile_axis(self.horizontal, hint.along(Axis::Horizontal), anchor_x);
        let (min_y, max_y) = reconcile_axis(self.vertical, hint.along(Axis::Vertical), anchor_y);
        Rect::from_edges(min_x, min_y, max_x, max_y)
    }
}
