//! The aggregation contract every statistic implements.
//!
//! An [`Aggregator<V, P, O>`] splits a per-key computation into three steps:
//!
//! - `combine`: raw values `V` held by one node → partial state `P`
//! - `merge`: several partial states → one partial state
//! - `finalize`: the last partial state → result `O`
//!
//! The partial state is closed under `merge`. Merging partials in any order
//! and any grouping, then finalizing, gives the same result as combining all
//! raw values in one batch. This is what lets an executor pre-aggregate on
//! any node, any number of times, or not at all.
//!
//! The contract is key-agnostic. Executors such as [`Runner`](crate::Runner)
//! own the key and attach it to any error they report.

use serde::{Serialize, de::DeserializeOwned};

use crate::error::{AggError, Result};

/// Bound for values and partial states that cross a shuffle boundary.
pub trait AggBound: 'static + Send + Sync + Clone + Serialize + DeserializeOwned {}
impl<T> AggBound for T where T: 'static + Send + Sync + Clone + Serialize + DeserializeOwned {}

/// A mergeable, two-phase aggregation over values `V` with partial state `P`
/// and result `O`.
///
/// Implementations must be pure: no state survives between calls, and
/// `merge` must be associative and commutative over the multiset of partials.
pub trait Aggregator<V, P, O>: Send + Sync + 'static {
    /// Pre-aggregate a batch of raw values sharing one key.
    fn combine(&self, values: Vec<V>) -> Result<P>;

    /// Merge partial states produced by `combine` or earlier `merge` calls.
    fn merge(&self, partials: Vec<P>) -> Result<P>;

    /// Turn the fully merged partial state into the result.
    fn finalize(&self, partial: P) -> Result<O>;

    /// Single-stage shortcut: `finalize(combine(values))`.
    fn reduce(&self, values: Vec<V>) -> Result<O> {
        let partial = self.combine(values)?;
        self.finalize(partial)
    }

    /// Merge `partials` in rounds of at most `fan_in` until one remains.
    ///
    /// A lone partial is returned without calling `merge`. An empty input is
    /// handed to `merge` so each aggregator applies its own empty rule.
    ///
    /// # Errors
    /// `InvalidParameter` when `fan_in < 2`, or any error raised by `merge`.
    fn merge_tree(&self, partials: Vec<P>, fan_in: usize) -> Result<P> {
        if fan_in < 2 {
            return Err(AggError::InvalidParameter(format!(
                "merge fan-in must be at least 2, got {fan_in}"
            )));
        }
        if partials.is_empty() {
            return self.merge(partials);
        }

        let mut level = partials;
        while level.len() > 1 {
            let mut next = Vec::with_capacity(level.len().div_ceil(fan_in));
            let mut it = level.into_iter().peekable();
            while it.peek().is_some() {
                let chunk: Vec<P> = it.by_ref().take(fan_in).collect();
                if chunk.len() == 1 {
                    next.extend(chunk);
                } else {
                    next.push(self.merge(chunk)?);
                }
            }
            level = next;
        }
        level.pop().ok_or(AggError::EmptyGroup)
    }
}
