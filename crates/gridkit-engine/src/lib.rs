//! # GridKit Engine
//!
//! Event-driven grid containers.
//!
//! A grid arranges child blocks on a sparse two-dimensional lattice. Every
//! grid runs as its own Tokio task and is driven purely by messages: children
//! report size hints, parents grant sizes, and the grid answers by sending
//! each child its bounds and reporting its own aggregated hint upward.
//!
//! ## Example
//!
//! ```no_run
//! use gridkit_engine::{Block, BlockData, GridBuilder};
//! use gridkit_layout::{Size, SizeHint};
//!
//! # async fn demo() -> Result<(), gridkit_engine::GridError> {
//! let grid = GridBuilder::new().spawn();
//! let (label, _events) = Block::new();
//!
//! grid.add(BlockData::new(label.clone(), 0, 0))?;
//! grid.report_hint(label.id(), SizeHint::fixed(Size::new(80.0, 20.0)))?;
//! grid.resize(Size::new(200.0, 100.0))?;
//!
//! let snapshot = grid.snapshot().await?;
//! println!("{:?}", snapshot.bounds_of(label.id()));
//! # Ok(())
//! # }
//! ```

pub mod block;
pub mod grid;
pub mod surface;

pub use block::{
    Block, BlockEvent, BlockId, BlockInvalidation, BlockSizeHint, HintSink, InvalidationSink,
};
pub use grid::{
    hbox, vbox, BlockData, GridBuilder, GridConfig, GridHandle, GridSettings, GridSnapshot,
};
pub use surface::{NullSurface, RecordingSurface, Surface, SurfaceLog};

use thiserror::Error;

/// Errors talking to a grid.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    #[error("Grid event loop has stopped")]
    Closed,

    #[error("Grid dropped the request without replying")]
    NoReply,
}
