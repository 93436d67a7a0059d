//! Test support utilities for grid integration tests
//!
//! This module provides helpers for writing integration tests:
//! - TestBlock: Leaf block that records the events its container sends
//! - Assertions: Geometry assertions with float tolerance

mod assertions;
mod test_block;

pub use assertions::*;
pub use test_block::TestBlock;

/// Route engine tracing to the test writer. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Poll `grid` until a snapshot satisfies `done`.
///
/// For state that settles across several grids, where a single snapshot
/// cannot act as a barrier.
pub async fn wait_for_snapshot(
    grid: &gridkit_engine::GridHandle,
    done: impl Fn(&gridkit_engine::GridSnapshot) -> bool,
) -> gridkit_engine::GridSnapshot {
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(2);
    loop {
        let snapshot = grid.snapshot().await.expect("Grid stopped");
        if done(&snapshot) {
            return snapshot;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "Grid never settled, last snapshot: {:?}",
            snapshot
        );
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
}
