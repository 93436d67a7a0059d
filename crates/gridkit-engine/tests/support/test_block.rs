//! Leaf block harness.

use std::time::Duration;

use gridkit_engine::{Block, BlockEvent, BlockId, BlockSizeHint, HintSink};
use gridkit_layout::{Size, SizeHint};
use tokio::sync::mpsc;

use super::size_is_near;

/// How long to wait for a container to react before failing.
const EVENT_TIMEOUT: Duration = Duration::from_secs(2);

/// A leaf block that records what its container tells it.
///
/// Behaves like a real child: on attach it keeps the parent's hint sink so
/// [`TestBlock::report`] can talk back.
pub struct TestBlock {
    block: Block,
    events: mpsc::UnboundedReceiver<BlockEvent>,
    parent_hints: Option<HintSink>,
    /// Last size granted by the container.
    pub size: Option<Size>,
    /// Number of resize events seen.
    pub resizes: usize,
}

impl TestBlock {
    pub fn new() -> Self {
        let (block, events) = Block::new();
        Self {
            block,
            events,
            parent_hints: None,
            size: None,
            resizes: 0,
        }
    }

    pub fn id(&self) -> BlockId {
        self.block.id()
    }

    /// Handle to pass to a grid.
    pub fn block(&self) -> Block {
        self.block.clone()
    }

    fn observe(&mut self, event: &BlockEvent) {
        match event {
            BlockEvent::Resize { size } => {
                self.size = Some(*size);
                self.resizes += 1;
            }
            BlockEvent::Attached { hints, .. } => {
                self.parent_hints = Some(hints.clone());
            }
            BlockEvent::Detached { .. } => {
                self.parent_hints = None;
            }
        }
    }

    /// Process every event already delivered. Returns how many there were.
    pub fn drain(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.events.try_recv() {
            self.observe(&event);
            count += 1;
        }
        count
    }

    /// Wait for the next event.
    pub async fn next_event(&mut self) -> BlockEvent {
        let event = tokio::time::timeout(EVENT_TIMEOUT, self.events.recv())
            .await
            .expect("Timed out waiting for block event")
            .expect("Block event channel closed");
        self.observe(&event);
        event
    }

    /// Wait until the container attaches this block.
    pub async fn wait_attached(&mut self) {
        while self.parent_hints.is_none() {
            self.next_event().await;
        }
    }

    /// Wait until the container grants `expected`.
    pub async fn wait_for_size(&mut self, expected: Size) {
        self.drain();
        while !self.size.is_some_and(|size| size_is_near(size, expected)) {
            self.next_event().await;
        }
    }

    /// Report a size hint to the attached container.
    pub fn report(&self, hint: SizeHint) {
        let sink = self
            .parent_hints
            .as_ref()
            .expect("Block is not attached to a container");
        sink.send(BlockSizeHint {
            block: self.id(),
            hint,
        })
        .expect("Container stopped accepting hints");
    }
}
