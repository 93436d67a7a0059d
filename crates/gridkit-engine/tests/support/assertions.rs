//! Custom assertions for integration tests.

use gridkit_engine::{BlockId, GridSnapshot};
use gridkit_layout::{Rect, Size};

const EPSILON: f32 = 1e-3;

fn near(a: f32, b: f32) -> bool {
    (a - b).abs() <= EPSILON || (a.is_infinite() && a == b)
}

/// Assert that two rectangles match within float tolerance.
#[track_caller]
pub fn assert_rect_near(actual: Rect, expected: Rect) {
    assert!(
        near(actual.x, expected.x)
            && near(actual.y, expected.y)
            && near(actual.width, expected.width)
            && near(actual.height, expected.height),
        "Rect mismatch: expected {:?}, got {:?}",
        expected,
        actual
    );
}

/// Whether two sizes match within float tolerance.
pub fn size_is_near(actual: Size, expected: Size) -> bool {
    near(actual.width, expected.width) && near(actual.height, expected.height)
}

/// Assert that two sizes match within float tolerance.
#[track_caller]
pub fn assert_size_near(actual: Size, expected: Size) {
    assert!(
        size_is_near(actual, expected),
        "Size mismatch: expected {:?}, got {:?}",
        expected,
        actual
    );
}

/// Assert that a snapshot holds bounds for `block` matching `expected`.
#[track_caller]
pub fn assert_bounds(snapshot: &GridSnapshot, block: BlockId, expected: Rect) {
    match snapshot.bounds_of(block) {
        Some(actual) => assert_rect_near(actual, expected),
        None => panic!("No bounds recorded for {:?}", block),
    }
}
