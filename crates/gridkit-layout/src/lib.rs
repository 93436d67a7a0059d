//! # GridKit Layout
//!
//! Layout core for GridKit grid containers.
//! Turns per-child size hints and grid coordinates into concrete bounds.
//!
//! ## Design Goals
//!
//! 1. **Axis solving**: Each axis is solved as an independent one-dimensional
//!    flex problem over indexed slots (see [`flex`])
//! 2. **Three-tier bounds**: Slots grow from minimum to preferred to maximum
//! 3. **Cell reconciliation**: Generous span cells are trimmed to each child's
//!    own bounds according to its anchor (see [`cell`])
//! 4. **Lazy rebuild**: Solver snapshots are invalidated as a unit and rebuilt
//!    on read (see [`cache`])
//! 5. **Paint commands**: Containers describe their background as a display
//!    list (see [`display`])

pub mod cache;
pub mod cell;
pub mod display;
pub mod flex;

pub use cache::{CacheStats, GridSolvers, SolverCache};
pub use cell::{reconcile_axis, trim_span, Anchor, Cell, CellSpan};
pub use display::{DisplayCommand, DisplayList};
pub use flex::{Axis, AxisFlex, AxisHint, AxisPartition, FlexElem};

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur in layout.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Invalid size hint on {axis:?} axis: min {min}, preferred {preferred}, max {max}")]
    InvalidSizeHint {
        axis: Axis,
        min: f32,
        preferred: f32,
        max: f32,
    },
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const INFINITE: Size = Size {
        width: f32::INFINITY,
        height: f32::INFINITY,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Get the component along an axis.
    pub fn along(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at the origin covering `size`.
    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    /// Build a rectangle from its edge coordinates.
    pub fn from_edges(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Minimum, preferred and maximum size a block reports for itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizeHint {
    pub min: Size,
    pub preferred: Size,
    pub max: Size,
}

impl Default for SizeHint {
    /// A block that has not reported anything: no minimum, no preference,
    /// unbounded growth.
    fn default() -> Self {
        Self {
            min: Size::zero(),
            preferred: Size::zero(),
            max: Size::INFINITE,
        }
    }
}

impl SizeHint {
    pub fn new(min: Size, preferred: Size, max: Size) -> Self {
        Self {
            min,
            preferred,
            max,
        }
    }

    /// A hint that only accepts exactly `size`.
    pub fn fixed(size: Size) -> Self {
        Self::new(size, size, size)
    }

    /// Create a hint, rejecting tiers that are negative or out of order.
    pub fn try_new(min: Size, preferred: Size, max: Size) -> Result<Self, LayoutError> {
        let hint = Self::new(min, preferred, max);
        for axis in [Axis::Horizontal, Axis::Vertical] {
            let tiers = hint.along(axis);
            let ordered = tiers.min >= 0.0
                && tiers.min <= tiers.preferred
                && tiers.preferred <= tiers.max;
            if !ordered {
                return Err(LayoutError::InvalidSizeHint {
                    axis,
                    min: tiers.min,
                    preferred: tiers.preferred,
                    max: tiers.max,
                });
            }
        }
        Ok(hint)
    }

    /// Clamp every axis into `0 <= min <= preferred <= max`.
    pub fn normalized(self) -> Self {
        Self::from_axes(
            self.along(Axis::Horizontal).normalized(),
            self.along(Axis::Vertical).normalized(),
        )
    }

    /// Project the hint onto one axis.
    pub fn along(&self, axis: Axis) -> AxisHint {
        AxisHint::new(
            self.min.along(axis),
            self.preferred.along(axis),
            self.max.along(axis),
        )
    }

    /// Assemble a hint from its horizontal and vertical components.
    pub fn from_axes(horizontal: AxisHint, vertical: AxisHint) -> Self {
        Self {
            min: Size::new(horizontal.min, vertical.min),
            preferred: Size::new(horizontal.preferred, vertical.preferred),
            max: Size::new(horizontal.max, vertical.max),
        }
    }
}

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    /// Neutral gray used for container backgrounds.
    pub const NEUTRAL: Color = Color {
        r: 150,
        g: 150,
        b: 150,
        a: 1.0,
    };

    pub fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}
