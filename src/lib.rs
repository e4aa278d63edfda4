//! # Ironfold
//!
//! A library of **mergeable aggregations** for key-partitioned
//! map/combine/reduce pipelines. A mapper emits `(key, value)` pairs, a
//! combiner pre-aggregates values on the node that holds them, and a
//! reducer merges the partial results for each key into a final answer.
//!
//! Ironfold supplies the part in the middle that is easy to get wrong: the
//! split of each statistic into a local step and a global step, chosen so
//! that *where* and *how often* pre-aggregation happens never changes the
//! answer.
//!
//! ## Key Features
//!
//! - **One contract** - every statistic implements [`Aggregator`] with
//!   `combine`, `merge`, and `finalize`
//! - **Explicit partial states** - each aggregator has its own typed,
//!   serializable partial state, closed under `merge`
//! - **Built-in aggregators** - [`Sum`], [`VectorSum`], [`Count`], [`Mean`],
//!   [`Moments`], [`StableMoments`], [`Selection`] (top-k / bottom-k),
//!   [`Reservoir`] sampling, and [`Passthrough`]
//! - **Typed errors** - empty groups, arity mismatches, and incomparable
//!   keys surface as [`AggError`] instead of sentinels
//! - **Local runner** - [`Runner`] executes keyed aggregations sequentially
//!   or on a rayon pool, with bounded merge fan-in
//!
//! ## Quick Start
//!
//! ```
//! use ironfold::{Aggregator, Moments, Runner};
//!
//! // Two nodes each pre-aggregate their share...
//! let stats = Moments::<f64>::new();
//! let a = stats.combine(vec![4.0, 9.0, 2.0, 3.0])?;
//! let b = stats.combine(vec![4.0, 1.0, 0.0, 3.0])?;
//!
//! // ...and the reducer merges and finalizes once.
//! let summary = stats.finalize(stats.merge(vec![a, b])?)?;
//! assert_eq!(summary.count, 8);
//! assert_eq!(summary.mean, 3.25);
//! assert_eq!((summary.min, summary.max), (0.0, 9.0));
//!
//! // Or let the runner do the partitioning.
//! let records = vec![("a", 1u32), ("b", 5), ("a", 3)];
//! let out = Runner::sequential().run(&ironfold::Sum::<u32>::new(), records)?;
//! assert_eq!(out, vec![("a", 4), ("b", 5)]);
//! # Ok::<_, anyhow::Error>(())
//! ```
//!
//! ## Partial States
//!
//! | aggregator | partial state | result |
//! |---|---|---|
//! | [`Sum<T>`] | `T` | `T` |
//! | [`VectorSum<T>`] | `Vec<T>` | `Vec<T>` |
//! | [`Count`] | `u64` | `u64` |
//! | [`Mean<V>`] | [`MeanState`] | `f64` |
//! | [`Moments<V>`] | [`MomentState`] | [`Summary`] |
//! | [`StableMoments<V>`] | [`WelfordState`] | [`Summary`] |
//! | [`Selection<T, C>`] | [`Ranked<T>`] | `Vec<T>` |
//! | [`Reservoir<T>`] | [`Sample<T>`] | `Vec<T>` |
//! | [`Passthrough<T>`] | `Vec<T>` | `Vec<T>` |
//!
//! Partial states are `serde` types; [`codec`] moves them over the wire
//! without losing precision or order.
//!
//! ## Module Overview
//!
//! - [`aggregator`] - the `Aggregator` contract
//! - [`aggregators`] - built-in aggregators
//! - [`error`] - `AggError`
//! - [`codec`] - partial-state wire format
//! - [`config`] - serde configuration for selections and the runner
//! - [`runner`] - local keyed executor
//! - [`testing`] - assertions and merge-tree helpers for tests

pub mod aggregator;
pub mod aggregators;
pub mod codec;
pub mod config;
pub mod error;
pub mod runner;
pub mod testing;

// General re-exports
pub use aggregator::{AggBound, Aggregator};
pub use aggregators::{
    Count, Mean, MeanState, MomentState, Moments, Order, Passthrough, Ranked, Reservoir, Sample,
    Selection, StableMoments, Sum, Summary, VectorSum, WelfordState, identity_map,
};
pub use config::{RunnerConfig, SelectionConfig};
pub use error::{AggError, Result};
pub use runner::{ExecMode, Runner};
