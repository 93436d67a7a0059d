//! Blocks: the visual elements a grid arranges.
//!
//! A grid never owns its children. It knows each one by [`BlockId`] and talks
//! to it only through messages: [`BlockEvent`]s flow down to the child, and
//! [`BlockSizeHint`]s and [`BlockInvalidation`]s flow up to the container.

use std::sync::atomic::{AtomicU64, Ordering};

use gridkit_layout::{Rect, Size, SizeHint};
use tokio::sync::mpsc;

/// Unique identifier for a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(u64);

impl BlockId {
    pub(crate) fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Sink a container receives child size hints on.
pub type HintSink = mpsc::UnboundedSender<BlockSizeHint>;

/// Sink a container receives child damage on.
pub type InvalidationSink = mpsc::UnboundedSender<BlockInvalidation>;

/// Events delivered to a block by its container.
#[derive(Debug, Clone)]
pub enum BlockEvent {
    /// The container granted the block a new size.
    Resize { size: Size },
    /// The block was added to a container and should report to it.
    Attached {
        parent: BlockId,
        hints: HintSink,
        invalidations: InvalidationSink,
    },
    /// The block was removed from a container.
    Detached { parent: BlockId },
}

/// A block reporting its size hint to its container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockSizeHint {
    pub block: BlockId,
    pub hint: SizeHint,
}

/// A block reporting a region of itself that needs redrawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockInvalidation {
    pub block: BlockId,
    /// Damaged region in the block's own coordinates.
    pub region: Rect,
}

/// Handle to a block: its identity plus the channel its events arrive on.
#[derive(Debug, Clone)]
pub struct Block {
    id: BlockId,
    events: mpsc::UnboundedSender<BlockEvent>,
}

impl Block {
    /// Create a block and the receiver its events arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BlockEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (Self::from_sender(BlockId::new(), events), rx)
    }

    pub(crate) fn from_sender(id: BlockId, events: mpsc::UnboundedSender<BlockEvent>) -> Self {
        Self { id, events }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    /// Deliver an event without waiting.
    ///
    /// Returns `false` if the block's receiver is gone.
    pub fn send(&self, event: BlockEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Tell the block its new size.
    pub fn resize(&self, size: Size) -> bool {
        self.send(BlockEvent::Resize { size })
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Block {}
