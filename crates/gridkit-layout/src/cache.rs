//! Solver cache for grid containers.
//!
//! Rebuilding both axis solvers means walking every child, and a container
//! usually regrids several times between structural changes (every resize
//! reuses the same solvers). The pair of solvers is therefore cached and
//! invalidated as a unit.
//!
//! # Design
//!
//! The cache uses epoch-based invalidation: [`SolverCache::invalidate`] bumps
//! the epoch, and an entry built in an earlier epoch is stale. Nothing is ever
//! patched in place; a stale entry is rebuilt from scratch on the next read.
//!
//! # Usage
//!
//! ```ignore
//! // On any structural change:
//! cache.invalidate();
//!
//! // When the solvers are needed:
//! let solvers = cache.get_or_rebuild(|| GridSolvers::build(children));
//! ```

use tracing::trace;

use crate::flex::{Axis, AxisFlex};
use crate::SizeHint;

/// The horizontal and vertical solvers of one grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridSolvers {
    pub horizontal: AxisFlex,
    pub vertical: AxisFlex,
}

impl GridSolvers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the solver for an axis, mutably.
    pub fn along_mut(&mut self, axis: Axis) -> &mut AxisFlex {
        match axis {
            Axis::Horizontal => &mut self.horizontal,
            Axis::Vertical => &mut self.vertical,
        }
    }

    /// The size hint a container built from these solvers reports upward.
    pub fn size_hint(&self) -> SizeHint {
        SizeHint::from_axes(self.horizontal.aggregate(), self.vertical.aggregate())
    }
}

/// Cache statistics for debugging and profiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub lookups: u64,
    pub hits: u64,
    pub rebuilds: u64,
    pub invalidations: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            self.hits as f64 / self.lookups as f64
        }
    }
}

/// Epoch-tagged cache holding one [`GridSolvers`] entry.
#[derive(Debug, Clone)]
pub struct SolverCache {
    /// Current epoch. Starts ahead of the entry so the first read rebuilds.
    epoch: u64,
    /// (epoch the entry was built in, entry)
    entry: (u64, GridSolvers),
    stats: CacheStats,
}

impl Default for SolverCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverCache {
    pub fn new() -> Self {
        Self {
            epoch: 1,
            entry: (0, GridSolvers::new()),
            stats: CacheStats::default(),
        }
    }

    /// Mark the cached solvers stale.
    pub fn invalidate(&mut self) {
        self.epoch += 1;
        self.stats.invalidations += 1;
    }

    /// Whether the entry was built in the current epoch.
    pub fn is_fresh(&self) -> bool {
        self.entry.0 == self.epoch
    }

    /// Get the solvers, rebuilding them first if they are stale.
    pub fn get_or_rebuild<F>(&mut self, build: F) -> &GridSolvers
    where
        F: FnOnce() -> GridSolvers,
    {
        self.stats.lookups += 1;
        if self.is_fresh() {
            self.stats.hits += 1;
        } else {
            self.entry = (self.epoch, build());
            self.stats.rebuilds += 1;
            trace!(
                epoch = self.epoch,
                columns = self.entry.1.horizontal.slot_count(),
                rows = self.entry.1.vertical.slot_count(),
                "Rebuilt grid solvers"
            );
        }
        &self.entry.1
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
