//! GridKit Smoke Harness
//!
//! Builds a vertical box of leaf blocks, drives it through a scripted series
//! of resizes and checks that every pass produces stable, in-order bounds.
//! Prints a JSON verdict on stdout.

use std::time::Instant;

use gridkit_engine::{vbox, Block, BlockEvent, GridConfig, GridHandle, GridSnapshot};
use gridkit_layout::{Size, SizeHint};
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{error, info};

/// Parse command line arguments
struct Args {
    width: f32,
    height: f32,
    rows: usize,
    json: bool,
}

impl Args {
    fn parse() -> Self {
        let mut args = std::env::args().skip(1);
        let mut width = 320.0f32;
        let mut height = 480.0f32;
        let mut rows = 4usize;
        let mut json = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--width" => {
                    if let Some(val) = args.next() {
                        width = val.parse().unwrap_or(320.0);
                    }
                }
                "--height" => {
                    if let Some(val) = args.next() {
                        height = val.parse().unwrap_or(480.0);
                    }
                }
                "--rows" => {
                    if let Some(val) = args.next() {
                        rows = val.parse().unwrap_or(4);
                    }
                }
                "--json" => json = true,
                _ => {}
            }
        }

        Self {
            width,
            height,
            rows,
            json,
        }
    }
}

/// Leaf block with a deterministic hint: rows get wider further down and
/// every other row may stretch vertically.
fn row_hint(row: usize) -> SizeHint {
    let width = 40.0 + 20.0 * row as f32;
    let max_height = if row % 2 == 0 { f32::INFINITY } else { 40.0 };
    SizeHint::new(
        Size::new(width * 0.5, 10.0),
        Size::new(width, 20.0),
        Size::new(width, max_height),
    )
}

/// Check that rows are stacked top to bottom without overlap.
fn check_layout(snapshot: &GridSnapshot, rows: &[Block]) -> Result<(), String> {
    let mut previous_bottom = 0.0f32;
    for (index, row) in rows.iter().enumerate() {
        let bounds = snapshot
            .bounds_of(row.id())
            .ok_or_else(|| format!("row {} has no bounds", index))?;
        if bounds.y + 1e-3 < previous_bottom {
            return Err(format!(
                "row {} starts at {} above previous bottom {}",
                index, bounds.y, previous_bottom
            ));
        }
        if bounds.x != 0.0 {
            return Err(format!("row {} is not left-anchored: x = {}", index, bounds.x));
        }
        previous_bottom = bounds.bottom();
    }
    Ok(())
}

async fn run(args: &Args, grid: &GridHandle, rows: &[Block]) -> Result<serde_json::Value, String> {
    let sizes = [
        Size::new(args.width, args.height),
        Size::new(args.width * 0.5, args.height * 0.5),
        Size::new(args.width * 2.0, args.height * 2.0),
        Size::new(args.width, args.height),
    ];

    let mut passes = Vec::new();
    let mut first: Option<GridSnapshot> = None;

    for size in sizes {
        grid.resize(size).map_err(|e| e.to_string())?;
        let snapshot = grid.snapshot().await.map_err(|e| e.to_string())?;
        check_layout(&snapshot, rows)?;
        info!(width = size.width, height = size.height, "Layout pass ok");

        passes.push(json!({
            "size": size,
            "rows": rows
                .iter()
                .filter_map(|row| snapshot.bounds_of(row.id()))
                .collect::<Vec<_>>(),
        }));

        match &first {
            None => first = Some(snapshot),
            Some(reference) if reference.size == snapshot.size => {
                if reference.bounds != snapshot.bounds {
                    return Err("Bounds changed for an identical size".to_string());
                }
            }
            Some(_) => {}
        }
    }

    let snapshot = grid.snapshot().await.map_err(|e| e.to_string())?;
    Ok(json!({
        // Unbounded maxima serialize as null.
        "size_hint": snapshot.size_hint,
        "cache": {
            "lookups": snapshot.cache.lookups,
            "rebuilds": snapshot.cache.rebuilds,
            "hit_rate": snapshot.cache.hit_rate(),
        },
        "passes": passes,
    }))
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let start = Instant::now();
    info!(width = args.width, height = args.height, rows = args.rows, "Starting GridKit smoke test");

    let mut receivers: Vec<mpsc::UnboundedReceiver<BlockEvent>> = Vec::new();
    let mut rows = Vec::new();
    for _ in 0..args.rows {
        let (block, events) = Block::new();
        rows.push(block);
        receivers.push(events);
    }

    let grid = match vbox(GridConfig::default(), rows.iter().cloned()) {
        Ok(grid) => grid,
        Err(e) => {
            error!("Failed to build grid: {}", e);
            std::process::exit(1);
        }
    };
    for (index, row) in rows.iter().enumerate() {
        if let Err(e) = grid.report_hint(row.id(), row_hint(index)) {
            error!("Failed to report hint: {}", e);
            std::process::exit(1);
        }
    }

    let result = match run(&args, &grid, &rows).await {
        Ok(report) => json!({
            "status": "pass",
            "elapsed_ms": start.elapsed().as_millis(),
            "report": report,
        }),
        Err(reason) => {
            error!("Smoke test failed: {}", reason);
            json!({
                "status": "fail",
                "reason": reason,
                "elapsed_ms": start.elapsed().as_millis(),
            })
        }
    };

    let delivered: usize = receivers
        .iter_mut()
        .map(|rx| std::iter::from_fn(|| rx.try_recv().ok()).count())
        .sum();
    info!(events = delivered, "Row blocks received events");

    if args.json {
        println!("{}", result);
    } else {
        println!("{:#}", result);
    }

    if result["status"] != "pass" {
        std::process::exit(1);
    }
}
