//! Nested grid integration tests
//!
//! A grid is itself a block: placed in another grid it reports its
//! aggregated hint upward and lays out its own children in whatever size it
//! is granted.

use std::time::Duration;

use gridkit_engine::{hbox, vbox, BlockData, GridBuilder, GridConfig};
use gridkit_layout::{Anchor, Rect, Size, SizeHint};
use tokio::sync::mpsc;

use crate::support::{
    assert_bounds, assert_size_near, init_tracing, wait_for_snapshot, TestBlock,
};

fn bounded(min: f32, preferred: f32, max: f32) -> SizeHint {
    SizeHint::new(
        Size::new(min, min),
        Size::new(preferred, preferred),
        Size::new(max, max),
    )
}

#[tokio::test]
async fn test_report_to_receives_size_hints() {
    init_tracing();
    let (hints_tx, mut hints_rx) = mpsc::unbounded_channel();
    let grid = GridBuilder::new().report_to(hints_tx).spawn();
    let child = TestBlock::new();

    grid.add(BlockData::new(child.block(), 0, 0)).unwrap();
    grid.report_hint(child.id(), bounded(10.0, 20.0, 30.0)).unwrap();

    let expected = bounded(10.0, 20.0, 30.0);
    loop {
        let update = tokio::time::timeout(Duration::from_secs(2), hints_rx.recv())
            .await
            .expect("Timed out waiting for size hint")
            .expect("Grid dropped its hint sink");
        assert_eq!(update.block, grid.id());
        if update.hint == expected {
            break;
        }
    }
}

#[tokio::test]
async fn test_nested_grid_reports_upward_and_lays_out() {
    init_tracing();
    let outer = GridBuilder::new().spawn();
    let inner = GridBuilder::new().spawn();
    let mut leaf = TestBlock::new();

    inner
        .add(BlockData::new(leaf.block(), 0, 0).anchor_x(Anchor::Min).anchor_y(Anchor::Min))
        .unwrap();
    leaf.wait_attached().await;
    leaf.report(bounded(10.0, 20.0, 30.0));

    outer
        .add(BlockData::new(inner.block(), 0, 0).anchor_x(Anchor::Min).anchor_y(Anchor::Min))
        .unwrap();
    outer.resize(Size::new(100.0, 100.0)).unwrap();

    let expected = Rect::new(0.0, 0.0, 30.0, 30.0);
    let snapshot = wait_for_snapshot(&outer, |snapshot| {
        snapshot.bounds_of(inner.id()) == Some(expected)
    })
    .await;
    assert_size_near(snapshot.size_hint.max, Size::new(30.0, 30.0));

    let inner_snapshot = wait_for_snapshot(&inner, |snapshot| {
        snapshot.size == Size::new(30.0, 30.0)
    })
    .await;
    assert_bounds(&inner_snapshot, leaf.id(), expected);
    leaf.wait_for_size(Size::new(30.0, 30.0)).await;
}

#[tokio::test]
async fn test_nested_grid_damage_reaches_parent() {
    init_tracing();
    let surface = gridkit_engine::RecordingSurface::new();
    let outer = GridBuilder::new().surface(surface.clone()).spawn();
    let inner = GridBuilder::new().spawn();
    let leaf = TestBlock::new();

    inner.add(BlockData::new(leaf.block(), 0, 0)).unwrap();
    outer.add(BlockData::new(inner.block(), 0, 0)).unwrap();
    outer.resize(Size::new(40.0, 40.0)).unwrap();

    wait_for_snapshot(&inner, |snapshot| snapshot.size == Size::new(40.0, 40.0)).await;
    let snapshot = wait_for_snapshot(&outer, |_| {
        surface
            .log()
            .child_damage
            .iter()
            .any(|damage| damage.region == Rect::new(0.0, 0.0, 40.0, 40.0))
    })
    .await;
    assert_eq!(snapshot.id, outer.id());
    assert!(surface
        .log()
        .child_damage
        .iter()
        .all(|damage| damage.block == inner.id()));
}

#[tokio::test]
async fn test_vbox_stacks_rows() {
    init_tracing();
    let first = TestBlock::new();
    let second = TestBlock::new();
    let grid = vbox(GridConfig::default(), [first.block(), second.block()]).unwrap();

    grid.report_hint(first.id(), SizeHint::fixed(Size::new(30.0, 10.0)))
        .unwrap();
    grid.report_hint(second.id(), SizeHint::fixed(Size::new(50.0, 10.0)))
        .unwrap();
    grid.resize(Size::new(100.0, 40.0)).unwrap();

    let snapshot = grid.snapshot().await.unwrap();
    assert_bounds(&snapshot, first.id(), Rect::new(0.0, 0.0, 30.0, 10.0));
    assert_bounds(&snapshot, second.id(), Rect::new(0.0, 10.0, 50.0, 10.0));
}

#[tokio::test]
async fn test_hbox_lines_up_columns() {
    init_tracing();
    let first = TestBlock::new();
    let second = TestBlock::new();
    let grid = hbox(GridConfig::default(), [first.block(), second.block()]).unwrap();

    grid.report_hint(first.id(), SizeHint::fixed(Size::new(30.0, 10.0)))
        .unwrap();
    grid.report_hint(second.id(), SizeHint::fixed(Size::new(50.0, 20.0)))
        .unwrap();
    grid.resize(Size::new(100.0, 40.0)).unwrap();

    let snapshot = grid.snapshot().await.unwrap();
    assert_bounds(&snapshot, first.id(), Rect::new(0.0, 0.0, 30.0, 10.0));
    assert_bounds(&snapshot, second.id(), Rect::new(30.0, 0.0, 50.0, 20.0));
}

#[tokio::test]
async fn test_nested_grid_survives_parent_shutdown() {
    init_tracing();
    let outer = GridBuilder::new().spawn();
    let inner = GridBuilder::new().spawn();
    let leaf = TestBlock::new();

    inner.add(BlockData::new(leaf.block(), 0, 0)).unwrap();
    outer.add(BlockData::new(inner.block(), 0, 0)).unwrap();
    outer.resize(Size::new(40.0, 40.0)).unwrap();
    wait_for_snapshot(&inner, |snapshot| snapshot.size == Size::new(40.0, 40.0)).await;

    // The outer grid stops and drops the sinks the inner grid reports to.
    let outer_block = outer.block();
    drop(outer);
    for _ in 0..200 {
        if !outer_block.resize(Size::zero()) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    inner.resize(Size::new(25.0, 15.0)).unwrap();
    inner.report_hint(leaf.id(), SizeHint::fixed(Size::new(5.0, 5.0)))
        .unwrap();

    let snapshot = inner.snapshot().await.unwrap();
    assert_size_near(snapshot.size, Size::new(25.0, 15.0));
    assert_bounds(&snapshot, leaf.id(), Rect::new(0.0, 0.0, 5.0, 5.0));
}
