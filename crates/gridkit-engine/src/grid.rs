//! Grid container.
//!
//! A grid is an actor: [`GridBuilder::spawn`] starts a task that owns every
//! piece of grid state and returns a [`GridHandle`] for talking to it. Each
//! kind of operation has its own channel, and the task handles one message at
//! a time, so no state is shared and every operation is applied completely
//! (hint recomputed, children regridded) before the next one is looked at.
//!
//! ## Event handling
//!
//! | Message              | Effect                                        |
//! |----------------------|-----------------------------------------------|
//! | add                  | register placement, recompute hint, regrid    |
//! | remove               | drop placement and hint, recompute, regrid    |
//! | set config           | recompute hint                                |
//! | child size hint      | update cached hint, recompute, regrid         |
//! | resize               | store granted size, regrid                    |
//! | child invalidation   | passed through to the surface                 |
//! | get config, snapshot | answered inline on a reply channel            |
//!
//! Pending messages are taken in the order of that table, so a query always
//! observes every change sent before it.

use std::collections::HashMap;

use gridkit_layout::{
    Anchor, Axis, AxisPartition, CacheStats, Cell, Color, DisplayList, FlexElem, GridSolvers,
    Rect, Size, SizeHint, SolverCache,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, info_span, trace, warn, Instrument};

use crate::block::{
    Block, BlockEvent, BlockId, BlockInvalidation, BlockSizeHint, HintSink, InvalidationSink,
};
use crate::surface::{NullSurface, Surface};
use crate::GridError;

/// Grid configuration.
///
/// Recognizes no options; the grid stores it and hands it back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {}

/// Placement of a block in a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockData {
    pub block: Block,
    /// Column the block is anchored at.
    pub grid_x: usize,
    /// Row the block is anchored at.
    pub grid_y: usize,
    /// Additional columns covered.
    pub extra_x: usize,
    /// Additional rows covered.
    pub extra_y: usize,
    pub anchor_x: Anchor,
    pub anchor_y: Anchor,
}

impl BlockData {
    /// Place `block` in a single cell, centered on both axes.
    pub fn new(block: Block, grid_x: usize, grid_y: usize) -> Self {
        Self {
            block,
            grid_x,
            grid_y,
            extra_x: 0,
            extra_y: 0,
            anchor_x: Anchor::Center,
            anchor_y: Anchor::Center,
        }
    }

    /// Cover `extra_x` more columns and `extra_y` more rows.
    pub fn span(mut self, extra_x: usize, extra_y: usize) -> Self {
        self.extra_x = extra_x;
        self.extra_y = extra_y;
        self
    }

    pub fn anchor_x(mut self, anchor: Anchor) -> Self {
        self.anchor_x = anchor;
        self
    }

    pub fn anchor_y(mut self, anchor: Anchor) -> Self {
        self.anchor_y = anchor;
        self
    }
}

/// Grid settings.
#[derive(Debug, Clone)]
pub struct GridSettings {
    /// Initial configuration.
    pub config: GridConfig,
    /// Background fill.
    pub background: Color,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            config: GridConfig::default(),
            background: Color::NEUTRAL,
        }
    }
}

/// Layout state of a grid at one point in its event stream.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSnapshot {
    pub id: BlockId,
    /// Size granted by the parent.
    pub size: Size,
    /// Size hint reported to the parent.
    pub size_hint: SizeHint,
    pub config: GridConfig,
    /// Last computed bounds of every child.
    pub bounds: HashMap<BlockId, Rect>,
    pub cache: CacheStats,
}

impl GridSnapshot {
    pub fn bounds_of(&self, block: BlockId) -> Option<Rect> {
        self.bounds.get(&block).copied()
    }
}

/// Builder for grids.
pub struct GridBuilder {
    settings: GridSettings,
    surface: Box<dyn Surface>,
    report_to: Option<HintSink>,
}

impl GridBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            settings: GridSettings::default(),
            surface: Box::new(NullSurface),
            report_to: None,
        }
    }

    /// Set the initial configuration.
    pub fn config(mut self, config: GridConfig) -> Self {
        self.settings.config = config;
        self
    }

    /// Set the background color.
    pub fn background(mut self, color: Color) -> Self {
        self.settings.background = color;
        self
    }

    /// Set the surface the grid paints into.
    pub fn surface(mut self, surface: impl Surface) -> Self {
        self.surface = Box::new(surface);
        self
    }

    /// Report size hints to `sink` until the grid is attached to a parent.
    pub fn report_to(mut self, sink: HintSink) -> Self {
        self.report_to = Some(sink);
        self
    }

    /// Start the grid's event loop.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn(self) -> GridHandle {
        let id = BlockId::new();

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (hints_tx, hints_rx) = mpsc::unbounded_channel();
        let (invalidations_tx, invalidations_rx) = mpsc::unbounded_channel();
        let (add_tx, add_rx) = mpsc::unbounded_channel();
        let (remove_tx, remove_rx) = mpsc::unbounded_channel();
        let (set_config_tx, set_config_rx) = mpsc::unbounded_channel();
        let (get_config_tx, get_config_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = mpsc::unbounded_channel();

        let grid = Grid {
            id,
            config: self.settings.config,
            background: self.settings.background,
            children: HashMap::new(),
            cache: SolverCache::new(),
            size: Size::zero(),
            size_hint: SizeHint::fixed(Size::zero()),
            parent: self.report_to.map(|hints| ParentLink {
                id: None,
                hints,
                invalidations: None,
            }),
            surface: self.surface,
            hints_tx: hints_tx.clone(),
            invalidations_tx: invalidations_tx.clone(),
        };

        let inbox = Inbox {
            add: add_rx,
            remove: remove_rx,
            set_config: set_config_rx,
            hints: hints_rx,
            events: events_rx,
            invalidations: invalidations_rx,
            get_config: get_config_rx,
            snapshot: snapshot_rx,
        };

        tokio::spawn(grid.run(inbox).instrument(info_span!("grid", id = id.raw())));

        GridHandle {
            block: Block::from_sender(id, events_tx),
            add_tx,
            remove_tx,
            set_config_tx,
            get_config_tx,
            snapshot_tx,
            hints_tx,
            invalidations_tx,
        }
    }

    /// Spawn a grid stacking `blocks` top to bottom, anchored to the left edge.
    pub fn spawn_vbox(
        self,
        blocks: impl IntoIterator<Item = Block>,
    ) -> Result<GridHandle, GridError> {
        let grid = self.spawn();
        for (row, block) in blocks.into_iter().enumerate() {
            grid.add(BlockData::new(block, 0, row).anchor_x(Anchor::Min))?;
        }
        Ok(grid)
    }

    /// Spawn a grid lining `blocks` up left to right, anchored to the top edge.
    pub fn spawn_hbox(
        self,
        blocks: impl IntoIterator<Item = Block>,
    ) -> Result<GridHandle, GridError> {
        let grid = self.spawn();
        for (column, block) in blocks.into_iter().enumerate() {
            grid.add(BlockData::new(block, column, 0).anchor_y(Anchor::Min))?;
        }
        Ok(grid)
    }
}

impl Default for GridBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn a vertical box with default settings.
pub fn vbox(
    config: GridConfig,
    blocks: impl IntoIterator<Item = Block>,
) -> Result<GridHandle, GridError> {
    GridBuilder::new().config(config).spawn_vbox(blocks)
}

/// Spawn a horizontal box with default settings.
pub fn hbox(
    config: GridConfig,
    blocks: impl IntoIterator<Item = Block>,
) -> Result<GridHandle, GridError> {
    GridBuilder::new().config(config).spawn_hbox(blocks)
}

/// Handle to a running grid.
///
/// Cloning is cheap. The grid stops once every handle has been dropped.
#[derive(Debug, Clone)]
pub struct GridHandle {
    block: Block,
    add_tx: mpsc::UnboundedSender<BlockData>,
    remove_tx: mpsc::UnboundedSender<BlockId>,
    set_config_tx: mpsc::UnboundedSender<GridConfig>,
    get_config_tx: mpsc::UnboundedSender<oneshot::Sender<GridConfig>>,
    snapshot_tx: mpsc::UnboundedSender<oneshot::Sender<GridSnapshot>>,
    hints_tx: HintSink,
    invalidations_tx: InvalidationSink,
}

impl GridHandle {
    pub fn id(&self) -> BlockId {
        self.block.id()
    }

    /// The grid as a block, for placing it inside another grid.
    pub fn block(&self) -> Block {
        self.block.clone()
    }

    /// Add a block. Adding a block that is already present replaces its
    /// placement.
    pub fn add(&self, data: BlockData) -> Result<(), GridError> {
        self.add_tx.send(data).map_err(|_| GridError::Closed)
    }

    /// Remove a block. Unknown blocks are ignored.
    pub fn remove(&self, block: BlockId) -> Result<(), GridError> {
        self.remove_tx.send(block).map_err(|_| GridError::Closed)
    }

    /// Replace the configuration.
    pub fn set_config(&self, config: GridConfig) -> Result<(), GridError> {
        self.set_config_tx.send(config).map_err(|_| GridError::Closed)
    }

    /// Read the configuration.
    pub async fn config(&self) -> Result<GridConfig, GridError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.get_config_tx
            .send(reply_tx)
            .map_err(|_| GridError::Closed)?;
        reply_rx.await.map_err(|_| GridError::NoReply)
    }

    /// Grant the grid a new size.
    pub fn resize(&self, size: Size) -> Result<(), GridError> {
        if self.block.resize(size) {
            Ok(())
        } else {
            Err(GridError::Closed)
        }
    }

    /// Report a child's size hint on its behalf.
    pub fn report_hint(&self, block: BlockId, hint: SizeHint) -> Result<(), GridError> {
        self.hints_tx
            .send(BlockSizeHint { block, hint })
            .map_err(|_| GridError::Closed)
    }

    /// Report damage in a child on its behalf.
    pub fn invalidate_child(&self, block: BlockId, region: Rect) -> Result<(), GridError> {
        self.invalidations_tx
            .send(BlockInvalidation { block, region })
            .map_err(|_| GridError::Closed)
    }

    /// Sink children report size hints on.
    pub fn hint_sink(&self) -> HintSink {
        self.hints_tx.clone()
    }

    /// Sink children report damage on.
    pub fn invalidation_sink(&self) -> InvalidationSink {
        self.invalidations_tx.clone()
    }

    /// Capture the grid's current layout state.
    pub async fn snapshot(&self) -> Result<GridSnapshot, GridError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.snapshot_tx
            .send(reply_tx)
            .map_err(|_| GridError::Closed)?;
        reply_rx.await.map_err(|_| GridError::NoReply)
    }
}

/// Receiving ends of a grid's channels, in the order they are served.
struct Inbox {
    add: mpsc::UnboundedReceiver<BlockData>,
    remove: mpsc::UnboundedReceiver<BlockId>,
    set_config: mpsc::UnboundedReceiver<GridConfig>,
    hints: mpsc::UnboundedReceiver<BlockSizeHint>,
    events: mpsc::UnboundedReceiver<BlockEvent>,
    invalidations: mpsc::UnboundedReceiver<BlockInvalidation>,
    get_config: mpsc::UnboundedReceiver<oneshot::Sender<GridConfig>>,
    snapshot: mpsc::UnboundedReceiver<oneshot::Sender<GridSnapshot>>,
}

/// Where the grid reports its own hint and damage.
struct ParentLink {
    /// `None` when the sink was supplied at build time rather than by an
    /// attaching parent.
    id: Option<BlockId>,
    hints: HintSink,
    invalidations: Option<InvalidationSink>,
}

/// What the grid knows about one child.
struct ChildState {
    data: BlockData,
    hint: SizeHint,
    bounds: Option<Rect>,
}

/// Grid state. Lives inside the event loop task.
struct Grid {
    id: BlockId,
    config: GridConfig,
    background: Color,
    children: HashMap<BlockId, ChildState>,
    cache: SolverCache,
    size: Size,
    size_hint: SizeHint,
    parent: Option<ParentLink>,
    surface: Box<dyn Surface>,
    /// Handed to children when they are attached.
    hints_tx: HintSink,
    invalidations_tx: InvalidationSink,
}

impl Grid {
    async fn run(mut self, mut inbox: Inbox) {
        info!("Grid started");

        loop {
            tokio::select! {
                biased;

                data = inbox.add.recv() => match data {
                    Some(data) => self.add_block(data),
                    None => break,
                },
                Some(block) = inbox.remove.recv() => self.remove_block(block),
                Some(config) = inbox.set_config.recv() => self.set_config(config),
                Some(update) = inbox.hints.recv() => self.update_child_hint(update),
                Some(event) = inbox.events.recv() => self.handle_event(event),
                Some(invalidation) = inbox.invalidations.recv() => {
                    trace!(block = ?invalidation.block, region = ?invalidation.region, "Child invalidated");
                    self.surface.child_invalidated(invalidation);
                }
                Some(reply) = inbox.get_config.recv() => {
                    let _ = reply.send(self.config.clone());
                }
                Some(reply) = inbox.snapshot.recv() => {
                    let _ = reply.send(self.snapshot());
                }
            }
        }

        info!(children = self.children.len(), "Grid stopped");
    }

    fn handle_event(&mut self, event: BlockEvent) {
        match event {
            BlockEvent::Resize { size } => {
                debug!(width = size.width, height = size.height, "Grid resized");
                self.size = size;
                self.regrid();
            }
            BlockEvent::Attached {
                parent,
                hints,
                invalidations,
            } => {
                debug!(?parent, "Grid attached to parent");
                self.parent = Some(ParentLink {
                    id: Some(parent),
                    hints,
                    invalidations: Some(invalidations),
                });
                self.report_hint();
            }
            BlockEvent::Detached { parent } => {
                if self.parent.as_ref().is_some_and(|link| link.id == Some(parent)) {
                    debug!(?parent, "Grid detached from parent");
                    self.parent = None;
                }
            }
        }
    }

    fn add_block(&mut self, data: BlockData) {
        let id = data.block.id();

        if let Some(child) = self.children.get_mut(&id) {
            debug!(block = ?id, x = data.grid_x, y = data.grid_y, "Replacing block placement");
            child.data = data;
        } else {
            debug!(block = ?id, x = data.grid_x, y = data.grid_y, "Adding block");
            let attached = data.block.send(BlockEvent::Attached {
                parent: self.id,
                hints: self.hints_tx.clone(),
                invalidations: self.invalidations_tx.clone(),
            });
            if !attached {
                warn!(block = ?id, "Added block has no event receiver");
            }
            self.children.insert(
                id,
                ChildState {
                    data,
                    hint: SizeHint::default(),
                    bounds: None,
                },
            );
        }

        self.cache.invalidate();
        self.make_preferences();
        self.regrid();
    }

    fn remove_block(&mut self, block: BlockId) {
        let Some(child) = self.children.remove(&block) else {
            debug!(?block, "Ignoring removal of unknown block");
            return;
        };

        debug!(?block, "Removing block");
        child.data.block.send(BlockEvent::Detached { parent: self.id });

        self.cache.invalidate();
        self.make_preferences();
        self.regrid();
    }

    fn set_config(&mut self, config: GridConfig) {
        debug!(?config, "Grid config replaced");
        self.config = config;
        self.cache.invalidate();
        self.make_preferences();
    }

    fn update_child_hint(&mut self, update: BlockSizeHint) {
        let Some(child) = self.children.get_mut(&update.block) else {
            debug!(block = ?update.block, "Ignoring size hint from unknown block");
            return;
        };

        child.hint = update.hint.normalized();
        trace!(block = ?update.block, hint = ?child.hint, "Child size hint updated");

        self.cache.invalidate();
        self.make_preferences();
        self.regrid();
    }

    /// Current solvers, rebuilt from the children if stale.
    fn solvers(&mut self) -> &GridSolvers {
        let children = &self.children;
        self.cache.get_or_rebuild(|| build_solvers(children.values()))
    }

    /// Recompute the grid's own size hint and report it upward.
    fn make_preferences(&mut self) {
        self.size_hint = self.solvers().size_hint();
        debug!(
            min = ?self.size_hint.min,
            preferred = ?self.size_hint.preferred,
            max = ?self.size_hint.max,
            "Size hint recomputed"
        );
        self.report_hint();
    }

    fn report_hint(&self) {
        let Some(parent) = &self.parent else {
            return;
        };
        let update = BlockSizeHint {
            block: self.id,
            hint: self.size_hint,
        };
        if parent.hints.send(update).is_err() {
            warn!("Parent no longer accepts size hints");
        }
    }

    /// Recompute every child's bounds against the granted size.
    fn regrid(&mut self) {
        let size = self.size;
        let solvers = self.solvers();
        let columns = solvers.horizontal.partition(size.width);
        let rows = solvers.vertical.partition(size.height);

        for (id, child) in self.children.iter_mut() {
            let data = &child.data;
            let Some(cell) = cell_for(data, &columns, &rows) else {
                warn!(block = ?id, "Block placement outside solved grid");
                continue;
            };

            let bounds = cell.reconcile(&child.hint, data.anchor_x, data.anchor_y);
            trace!(block = ?id, cell = ?cell.bounds(), ?bounds, "Placed block");
            child.bounds = Some(bounds);

            if !data.block.resize(bounds.size()) {
                warn!(block = ?id, "Block no longer receives events");
            }
        }

        self.redraw();
    }

    fn redraw(&mut self) {
        let full = Rect::from_size(self.size);
        self.surface
            .paint(DisplayList::background(self.size, self.background));
        self.surface.invalidate(full);

        let Some(invalidations) = self.parent.as_ref().and_then(|p| p.invalidations.as_ref()) else {
            return;
        };
        let damage = BlockInvalidation {
            block: self.id,
            region: full,
        };
        if invalidations.send(damage).is_err() {
            warn!("Parent no longer accepts damage reports");
        }
    }

    fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            id: self.id,
            size: self.size,
            size_hint: self.size_hint,
            config: self.config.clone(),
            bounds: self
                .children
                .iter()
                .filter_map(|(id, child)| child.bounds.map(|bounds| (*id, bounds)))
                .collect(),
            cache: self.cache.stats(),
        }
    }
}

/// Build both axis solvers from the current children.
fn build_solvers<'a>(children: impl Iterator<Item = &'a ChildState>) -> GridSolvers {
    let mut solvers = GridSolvers::new();
    for child in children {
        let data = &child.data;
        solvers.along_mut(Axis::Horizontal).add(FlexElem::new(
            data.grid_x,
            data.extra_x,
            child.hint.along(Axis::Horizontal),
        ));
        solvers.along_mut(Axis::Vertical).add(FlexElem::new(
            data.grid_y,
            data.extra_y,
            child.hint.along(Axis::Vertical),
        ));
    }
    solvers
}

/// The generous cell a placement covers.
fn cell_for(data: &BlockData, columns: &AxisPartition, rows: &AxisPartition) -> Option<Cell> {
    Some(Cell::new(
        columns.span(data.grid_x, data.extra_x)?,
        rows.span(data.grid_y, data.extra_y)?,
    ))
}
