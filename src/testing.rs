//! Helpers for testing aggregators.
//!
//! The central property every aggregator must satisfy is that the shape of
//! the combine/merge tree does not matter. [`all_splits`] and
//! [`tree_reduce`] make that easy to check exhaustively for small inputs:
//!
//! ```
//! use ironfold::Aggregator;
//! use ironfold::aggregators::Sum;
//! use ironfold::testing::{all_splits, tree_reduce};
//!
//! let sum = Sum::<i32>::new();
//! let whole = sum.reduce(vec![1, 3, 7, 15])?;
//! for batches in all_splits(&[1, 3, 7, 15]) {
//!     assert_eq!(tree_reduce(&sum, batches, 2)?, whole);
//! }
//! # Ok::<_, ironfold::AggError>(())
//! ```

use std::fmt::Debug;

use crate::aggregator::Aggregator;
use crate::aggregators::Summary;
use crate::error::Result;

/// Assert that two floats differ by at most `tol`.
///
/// # Panics
///
/// Panics if `|actual - expected| > tol` or either side is `NaN`.
#[track_caller]
pub fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "Float mismatch:\n  Expected: {expected}\n  Actual: {actual}\n  Tolerance: {tol}"
    );
}

/// Assert that two summaries agree: counts exactly, floats within `tol`.
///
/// # Panics
///
/// Panics on the first field that differs.
#[track_caller]
pub fn assert_summary_close(actual: &Summary, expected: &Summary, tol: f64) {
    assert_eq!(
        actual.count, expected.count,
        "Summary count mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
    for (name, a, e) in [
        ("mean", actual.mean, expected.mean),
        ("stddev", actual.stddev, expected.stddev),
        ("min", actual.min, expected.min),
        ("max", actual.max, expected.max),
    ] {
        assert!(
            (a - e).abs() <= tol,
            "Summary {name} mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}\n  Tolerance: {tol}"
        );
    }
}

/// Assert that two collections hold the same elements with the same
/// multiplicities, ignoring order.
///
/// # Panics
///
/// Panics if the sorted collections differ.
#[track_caller]
pub fn assert_same_multiset<T: Debug + Ord + Clone>(actual: &[T], expected: &[T]) {
    let mut a = actual.to_vec();
    let mut e = expected.to_vec();
    a.sort();
    e.sort();
    assert_eq!(
        a, e,
        "Multiset mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
}

/// Cut `values` into consecutive batches of the given sizes.
///
/// Anything left over after the listed sizes becomes one final batch.
///
/// # Panics
///
/// Panics if the sizes add up to more than `values.len()`.
#[must_use]
pub fn split_at_sizes<T: Clone>(values: &[T], sizes: &[usize]) -> Vec<Vec<T>> {
    let total: usize = sizes.iter().sum();
    assert!(
        total <= values.len(),
        "split sizes {sizes:?} exceed input length {}",
        values.len()
    );
    let mut out = Vec::with_capacity(sizes.len() + 1);
    let mut start = 0;
    for &n in sizes {
        out.push(values[start..start + n].to_vec());
        start += n;
    }
    if start < values.len() {
        out.push(values[start..].to_vec());
    }
    out
}

/// Every way to cut `values` into non-empty contiguous batches
/// (`2^(n-1)` splits, so keep `n` small).
#[must_use]
pub fn all_splits<T: Clone>(values: &[T]) -> Vec<Vec<Vec<T>>> {
    if values.is_empty() {
        return Vec::new();
    }
    let cuts = values.len() - 1;
    (0u64..(1u64 << cuts))
        .map(|mask| {
            let mut batches = Vec::new();
            let mut start = 0;
            for i in 0..cuts {
                if mask & (1 << i) != 0 {
                    batches.push(values[start..=i].to_vec());
                    start = i + 1;
                }
            }
            batches.push(values[start..].to_vec());
            batches
        })
        .collect()
}

/// Combine each batch, merge the partials as a tree with `fan_in`, and
/// finalize.
///
/// # Errors
/// Any error raised by the aggregator.
pub fn tree_reduce<V, P, O, A>(agg: &A, batches: Vec<Vec<V>>, fan_in: usize) -> Result<O>
where
    A: Aggregator<V, P, O>,
{
    let partials = batches
        .into_iter()
        .map(|b| agg.combine(b))
        .collect::<Result<Vec<P>>>()?;
    let merged = agg.merge_tree(partials, fan_in)?;
    agg.finalize(merged)
}
