//! Drawing collaborator for grid containers.
//!
//! The grid does not manage pixel buffers. It hands a display list to its
//! surface whenever it repaints, marks regions dirty, and passes child damage
//! through.

use std::sync::{Arc, Mutex};

use gridkit_layout::{DisplayList, Rect};

use crate::block::BlockInvalidation;

/// Drawing target owned by a grid's event loop.
pub trait Surface: Send + 'static {
    /// Replace the container's painted content.
    fn paint(&mut self, list: DisplayList);

    /// Mark a region of the container as needing redraw.
    fn invalidate(&mut self, region: Rect);

    /// Damage reported by a child, passed through unchanged.
    fn child_invalidated(&mut self, invalidation: BlockInvalidation) {
        self.invalidate(invalidation.region);
    }
}

/// Surface that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSurface;

impl Surface for NullSurface {
    fn paint(&mut self, _list: DisplayList) {}

    fn invalidate(&mut self, _region: Rect) {}
}

/// Everything a [`RecordingSurface`] has seen.
#[derive(Debug, Clone, Default)]
pub struct SurfaceLog {
    /// Display lists in paint order.
    pub paints: Vec<DisplayList>,
    /// Regions the container marked dirty.
    pub dirty: Vec<Rect>,
    /// Child damage passed through.
    pub child_damage: Vec<BlockInvalidation>,
}

/// Surface that records paints and invalidations for inspection.
///
/// Clones share the same log, so one clone can be handed to a grid while
/// another is kept for reading.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    log: Arc<Mutex<SurfaceLog>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the log so far.
    pub fn log(&self) -> SurfaceLog {
        match self.log.lock() {
            Ok(log) => log.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// The most recent display list, if anything was painted.
    pub fn last_paint(&self) -> Option<DisplayList> {
        self.log().paints.last().cloned()
    }

    fn record(&self, f: impl FnOnce(&mut SurfaceLog)) {
        if let Ok(mut log) = self.log.lock() {
            f(&mut log);
        }
    }
}

impl Surface for RecordingSurface {
    fn paint(&mut self, list: DisplayList) {
        self.record(|log| log.paints.push(list));
    }

    fn invalidate(&mut self, region: Rect) {
        self.record(|log| log.dirty.push(region));
    }

    fn child_invalidated(&mut self, invalidation: BlockInvalidation) {
        self.record(|log| log.child_damage.push(invalidation));
    }
}
