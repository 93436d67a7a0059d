//! One-dimensional flex solver for grid slots.
//!
//! A grid is laid out as two independent axis problems. Along one axis every
//! child contributes its size hint to the slot it is anchored at; children that
//! span several slots still contribute only to their anchor slot. The solver
//! then answers two questions:
//!
//! 1. What total size range does the axis need? ([`AxisFlex::aggregate`])
//! 2. Given a granted length, where are the slot boundaries?
//!    ([`AxisFlex::partition`])
//!
//! Partitioning grows slots in three tiers:
//! 1. Every slot starts at its minimum size. If the granted length does not
//!    cover the minimum total, slots stay at their minimum and overflow.
//! 2. Growth up to preferred sizes, proportional to `preferred - min`.
//!    The boundaries at this point form the conservative edge array.
//! 3. Remaining growth up to maximum sizes, proportional to `max - preferred`.
//!    The boundaries at this point form the generous edge array.
//!
//! In either growth tier, slots with infinite headroom absorb all of the
//! growth, split evenly among themselves.

use tracing::trace;

use crate::cell::CellSpan;

/// Represents the horizontal and vertical axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Minimum, preferred and maximum size along a single axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisHint {
    pub min: f32,
    pub preferred: f32,
    /// May be `f32::INFINITY`.
    pub max: f32,
}

impl Default for AxisHint {
    fn default() -> Self {
        Self::ZERO
    }
}

impl AxisHint {
    /// Occupies no space and cannot grow.
    pub const ZERO: AxisHint = AxisHint {
        min: 0.0,
        preferred: 0.0,
        max: 0.0,
    };

    pub fn new(min: f32, preferred: f32, max: f32) -> Self {
        Self {
            min,
            preferred,
            max,
        }
    }

    /// Exactly `size`, no growth.
    pub fn fixed(size: f32) -> Self {
        Self::new(size, size, size)
    }

    /// At least `min`, prefers `preferred`, grows without bound.
    pub fn flexible(min: f32, preferred: f32) -> Self {
        Self::new(min, preferred, f32::INFINITY)
    }

    /// Clamp into `0 <= min <= preferred <= max`. NaN tiers collapse onto the
    /// tier below them.
    pub fn normalized(self) -> Self {
        let min = if self.min.is_nan() { 0.0 } else { self.min.max(0.0) };
        let preferred = if self.preferred.is_nan() {
            min
        } else {
            self.preferred.max(min)
        };
        let max = if self.max.is_nan() {
            preferred
        } else {
            self.max.max(preferred)
        };
        Self::new(min, preferred, max)
    }

    /// Combine two hints sharing a slot: the slot must satisfy the largest
    /// requirement of each tier.
    pub fn merge(self, other: AxisHint) -> Self {
        Self::new(
            self.min.max(other.min),
            self.preferred.max(other.preferred),
            self.max.max(other.max),
        )
        .normalized()
    }

    /// Whether the maximum is unbounded.
    pub fn is_unbounded(&self) -> bool {
        self.max.is_infinite()
    }
}

/// A child's contribution to one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlexElem {
    /// Anchor slot.
    pub index: usize,
    /// Additional slots covered after the anchor.
    pub extra: usize,
    /// The child's size hint along this axis.
    pub hint: AxisHint,
}

impl FlexElem {
    pub fn new(index: usize, extra: usize, hint: AxisHint) -> Self {
        Self { index, extra, hint }
    }

    /// Last slot covered by this element.
    pub fn last_slot(&self) -> usize {
        self.index + self.extra
    }
}

/// Slot aggregates for one axis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisFlex {
    /// Combined hint per slot index. Slots nobody is anchored at stay
    /// [`AxisHint::ZERO`].
    slots: Vec<AxisHint>,
}

impl AxisFlex {
    /// Create an empty solver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a child's contribution.
    pub fn add(&mut self, elem: FlexElem) {
        let needed = elem.last_slot() + 1;
        if self.slots.len() < needed {
            self.slots.resize(needed, AxisHint::ZERO);
        }

        let slot = &mut self.slots[elem.index];
        *slot = slot.merge(elem.hint);
    }

    /// Number of slots, including empty slots covered only by spans.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Combined hint of a slot.
    pub fn slot(&self, index: usize) -> Option<AxisHint> {
        self.slots.get(index).copied()
    }

    /// Total `(min, preferred, max)` needed by the axis.
    pub fn aggregate(&self) -> AxisHint {
        self.slots.iter().fold(AxisHint::ZERO, |total, slot| {
            AxisHint::new(
                total.min + slot.min,
                total.preferred + slot.preferred,
                total.max + slot.max,
            )
        })
    }

    /// Split `total` across the slots.
    ///
    /// Negative or NaN lengths are treated as zero.
    pub fn partition(&self, total: f32) -> AxisPartition {
        let total = if total.is_nan() { 0.0 } else { total.max(0.0) };
        let totals = self.aggregate();

        let mut widths: Vec<f32> = self.slots.iter().map(|slot| slot.min).collect();
        let mut remaining = total - totals.min;

        if remaining > 0.0 {
            let headroom: Vec<f32> = self
                .slots
                .iter()
                .map(|slot| (slot.preferred - slot.min).max(0.0))
                .collect();
            remaining -= grow_proportionally(&mut widths, &headroom, remaining);
        }
        let min_edges = prefix_edges(&widths);

        if remaining > 0.0 {
            self.grow_beyond_preferred(&mut widths, remaining);
        }
        let max_edges = prefix_edges(&widths);

        trace!(
            slots = self.slots.len(),
            total,
            min_total = totals.min,
            pref_total = totals.preferred,
            "Partitioned axis"
        );

        AxisPartition {
            min_edges,
            max_edges,
        }
    }

    /// Third growth tier. Assumes every slot already sits at its preferred size.
    fn grow_beyond_preferred(&self, widths: &mut [f32], available: f32) {
        let headroom: Vec<f32> = self
            .slots
            .iter()
            .map(|slot| {
                if slot.is_unbounded() {
                    f32::INFINITY
                } else {
                    (slot.max - slot.preferred).max(0.0)
                }
            })
            .collect();
        grow_proportionally(widths, &headroom, available);
    }
}

/// Grow each width by its share of `available`, capped at its headroom.
/// Widths with infinite headroom take everything, split evenly.
/// Returns the amount actually used.
fn grow_proportionally(widths: &mut [f32], headroom: &[f32], available: f32) -> f32 {
    let unbounded: Vec<usize> = headroom
        .iter()
        .enumerate()
        .filter(|(_, room)| room.is_infinite())
        .map(|(i, _)| i)
        .collect();

    if !unbounded.is_empty() {
        let share = available / unbounded.len() as f32;
        for i in unbounded {
            widths[i] += share;
        }
        return available;
    }

    let total_headroom: f32 = headroom.iter().sum();
    if total_headroom <= 0.0 {
        return 0.0;
    }

    let used = available.min(total_headroom);
    for (width, room) in widths.iter_mut().zip(headroom) {
        *width += used * room / total_headroom;
    }
    used
}

/// Cumulative boundaries, starting at 0.
fn prefix_edges(widths: &[f32]) -> Vec<f32> {
    let mut edges = Vec::with_capacity(widths.len() + 1);
    let mut position = 0.0f32;
    edges.push(position);
    for width in widths {
        position += width;
        edges.push(position);
    }
    edges
}

/// Slot boundaries produced by [`AxisFlex::partition`].
///
/// Both arrays hold `slot_count + 1` cumulative boundaries; slot `i` spans
/// `edges[i]..edges[i + 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisPartition {
    /// Boundaries after growing slots no further than their preferred size.
    pub min_edges: Vec<f32>,
    /// Boundaries after all growth. These are the final slot positions.
    pub max_edges: Vec<f32>,
}

impl AxisPartition {
    /// Number of slots.
    pub fn slot_count(&self) -> usize {
        self.max_edges.len().saturating_sub(1)
    }

    /// The generous cell covering slots `index..=index + extra`.
    ///
    /// Returns `None` if the span runs past the last slot.
    pub fn span(&self, index: usize, extra: usize) -> Option<CellSpan> {
        let last = index + extra + 1;
        let start = *self.max_edges.get(index)?;
        let end = *self.max_edges.get(last)?;
        let preferred_extent = self.min_edges.get(last)? - self.min_edges.get(index)?;
        Some(CellSpan::new(start, end, preferred_extent))
    }
}
