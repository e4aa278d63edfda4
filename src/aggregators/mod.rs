//! Built-in aggregators.
//!
//! Each type implements [`Aggregator`](crate::Aggregator) with its own
//! partial-state type:
//!
//! - [`Sum<T>`] -- running sum; usable as its own combiner.
//! - [`VectorSum<T>`] -- per-position sum of equal-length tuples.
//! - [`Count`] -- number of values.
//! - [`Mean<V>`] -- arithmetic mean via [`MeanState`] `(sum, count)`.
//! - [`Moments<V>`] -- count, mean, sample stddev, min, max via power sums.
//! - [`StableMoments<V>`] -- the same [`Summary`] via Welford/Chan merging.
//! - [`Selection<T, C>`] -- top-k / bottom-k under a comparison key.
//! - [`Reservoir<T>`] -- bounded uniform sample.
//! - [`Passthrough<T>`] -- identity stage.
//!
//! # Examples
//! ```
//! use ironfold::Aggregator;
//! use ironfold::aggregators::{Mean, Selection, Sum};
//!
//! // Sum, split over two combiners
//! let sum = Sum::<i64>::new();
//! let a = sum.combine(vec![1, 3])?;
//! let b = sum.combine(vec![7, 15])?;
//! assert_eq!(sum.finalize(sum.merge(vec![a, b])?)?, 26);
//!
//! // Mean never averages partial means
//! let mean = Mean::<f64>::new();
//! let a = mean.combine(vec![1.0, 2.0, 3.0])?;
//! let b = mean.combine(vec![10.0])?;
//! assert_eq!(mean.finalize(mean.merge(vec![a, b])?)?, 4.0);
//!
//! // Top-2
//! let top = Selection::top(2)?;
//! let a = top.combine(vec![3u32, 9, 1])?;
//! let b = top.combine(vec![7u32])?;
//! assert_eq!(top.finalize(top.merge(vec![a, b])?)?, vec![9, 7]);
//! # Ok::<_, ironfold::AggError>(())
//! ```

mod basic;
mod identity;
mod sampling;
mod selection;
mod statistical;

// Re-export all public aggregators
pub use basic::{Count, Sum, VectorSum};
pub use identity::{Passthrough, identity_map};
pub use sampling::{Reservoir, Sample};
pub use selection::{Order, Ranked, Selection};
pub use statistical::{Mean, MeanState, MomentState, Moments, StableMoments, Summary, WelfordState};
