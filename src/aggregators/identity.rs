//! Identity stage: forwards values untouched.
//!
//! Useful when a job needs the shuffle/sort boundary between stages but no
//! computation at it, or as a terminal stage that writes values straight
//! through. Nothing is deduplicated or dropped.

use crate::aggregator::Aggregator;
use crate::error::Result;
use std::marker::PhantomData;

/// Identity mapper: emits its input pair unchanged.
#[inline]
pub fn identity_map<K, V>(key: K, value: V) -> (K, V) {
    (key, value)
}

/// Pass-through aggregator.
///
/// - Partial: `Vec<T>` (the values themselves)
/// - Output: `Vec<T>`
///
/// `combine` forwards its batch, `merge` concatenates batches in the order
/// given, and `finalize` returns everything. Multiplicity is always kept.
#[derive(Clone, Copy, Debug, Default)]
pub struct Passthrough<T>(pub PhantomData<T>);

impl<T> Passthrough<T> {
    /// Convenience constructor (same as `Default`).
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }

    /// Identity reducer: re-emit every value under `key`.
    pub fn emit<K: Clone>(key: &K, values: Vec<T>) -> Vec<(K, T)> {
        values.into_iter().map(|v| (key.clone(), v)).collect()
    }
}

impl<T: Send + Sync + 'static> Aggregator<T, Vec<T>, Vec<T>> for Passthrough<T> {
    fn combine(&self, values: Vec<T>) -> Result<Vec<T>> {
        Ok(values)
    }

    fn merge(&self, partials: Vec<Vec<T>>) -> Result<Vec<T>> {
        Ok(partials.into_iter().flatten().collect())
    }

    fn finalize(&self, acc: Vec<T>) -> Result<Vec<T>> {
        Ok(acc)
    }
}
