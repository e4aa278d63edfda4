//! Statistical aggregators: `Mean`, `Moments`, `StableMoments`

use crate::aggregator::Aggregator;
use crate::error::{AggError, Result};
use num_traits::AsPrimitive;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// Widen a raw value to `f64`, rejecting `NaN` and infinities.
fn finite<V: AsPrimitive<f64>>(v: V) -> Result<f64> {
    let x = v.as_();
    if x.is_finite() {
        Ok(x)
    } else {
        Err(AggError::InvalidValue(format!("non-finite input {x}")))
    }
}

/* ===================== Mean<V> ===================== */

/// Partial state of [`Mean`]: a plain sum and a count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeanState {
    pub sum: f64,
    pub count: u64,
}

/// Arithmetic mean of values per key as `f64`.
///
/// Any primitive number is accepted (`AsPrimitive<f64>`); `NaN` and
/// infinities fail with [`AggError::InvalidValue`].
///
/// - Partial: [`MeanState`]
/// - Output: `f64`
///
/// Partial means are never averaged; only the sum and count travel between
/// stages, and the division happens once in `finalize`. Empty groups are an
/// error.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mean<V>(pub PhantomData<V>);
impl<V> Mean<V> {
    /// Convenience constructor (same as `Default`).
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<V> Aggregator<V, MeanState, f64> for Mean<V>
where
    V: AsPrimitive<f64> + Send + Sync,
{
    fn combine(&self, values: Vec<V>) -> Result<MeanState> {
        if values.is_empty() {
            return Err(AggError::EmptyGroup);
        }
        let count = values.len() as u64;
        let sum = values.into_iter().map(finite).sum::<Result<f64>>()?;
        Ok(MeanState { sum, count })
    }

    fn merge(&self, partials: Vec<MeanState>) -> Result<MeanState> {
        if partials.is_empty() {
            return Err(AggError::EmptyGroup);
        }
        Ok(partials
            .into_iter()
            .fold(MeanState::default(), |acc, s| MeanState {
                sum: acc.sum + s.sum,
                count: acc.count + s.count,
            }))
    }

    #[allow(clippy::cast_precision_loss)]
    fn finalize(&self, acc: MeanState) -> Result<f64> {
        if acc.count == 0 {
            return Err(AggError::EmptyGroup);
        }
        Ok(acc.sum / acc.count as f64)
    }
}

/* ===================== Summary ===================== */

/// Result of [`Moments`] and [`StableMoments`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of values.
    pub count: u64,
    pub mean: f64,
    /// Sample standard deviation (Bessel-corrected); exactly `0.0` when `count == 1`.
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
}

/* ===================== Moments<V> ===================== */

/// Partial state of [`Moments`]: `(n, Σv, Σv², min, max)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MomentState {
    pub count: u64,
    pub sum: f64,
    pub sum_sq: f64,
    pub min: f64,
    pub max: f64,
}

impl MomentState {
    fn of(v: f64) -> Self {
        Self {
            count: 1,
            sum: v,
            sum_sq: v * v,
            min: v,
            max: v,
        }
    }

    fn absorb(&mut self, other: &Self) {
        self.count += other.count;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }
}

/// Count, mean, sample standard deviation, min, and max per key.
///
/// - Partial: [`MomentState`]
/// - Output: [`Summary`]
///
/// Power sums are accumulated in one pass and combined by addition, so the
/// partial state stays five numbers no matter how many values it covers.
/// For data whose mean is large relative to its spread, prefer
/// [`StableMoments`], which avoids the cancellation in `Σv² − (Σv)²/n`.
///
/// `NaN` and infinite inputs are rejected with [`AggError::InvalidValue`],
/// so `min` and `max` always agree with `mean`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Moments<V>(pub PhantomData<V>);
impl<V> Moments<V> {
    /// Convenience constructor (same as `Default`).
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<V> Aggregator<V, MomentState, Summary> for Moments<V>
where
    V: AsPrimitive<f64> + Send + Sync,
{
    fn combine(&self, values: Vec<V>) -> Result<MomentState> {
        let mut it = values.into_iter().map(finite);
        let first = it.next().ok_or(AggError::EmptyGroup)??;
        let mut acc = MomentState::of(first);
        for v in it {
            acc.absorb(&MomentState::of(v?));
        }
        Ok(acc)
    }

    fn merge(&self, partials: Vec<MomentState>) -> Result<MomentState> {
        let mut it = partials.into_iter();
        let mut acc = it.next().ok_or(AggError::EmptyGroup)?;
        for s in it {
            acc.absorb(&s);
        }
        Ok(acc)
    }

    #[allow(clippy::cast_precision_loss)]
    fn finalize(&self, acc: MomentState) -> Result<Summary> {
        if acc.count == 0 {
            return Err(AggError::EmptyGroup);
        }
        let n = acc.count as f64;
        let stddev = if acc.count > 1 {
            // rounding can push a near-zero variance below zero
            ((acc.sum_sq - acc.sum * acc.sum / n) / (n - 1.0)).max(0.0).sqrt()
        } else {
            0.0
        };
        Ok(Summary {
            count: acc.count,
            mean: acc.sum / n,
            stddev,
            min: acc.min,
            max: acc.max,
        })
    }
}

/* ===================== StableMoments<V> ===================== */

/// Partial state of [`StableMoments`]: running mean and sum of squared
/// deviations (`m2`) alongside count, min, and max.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WelfordState {
    pub count: u64,
    pub mean: f64,
    pub m2: f64,
    pub min: f64,
    pub max: f64,
}

impl WelfordState {
    #[allow(clippy::cast_precision_loss)]
    fn update(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
        self.min = self.min.min(x);
        self.max = self.max.max(x);
    }

    /// Chan et al. pairwise combination.
    #[allow(clippy::cast_precision_loss)]
    fn absorb(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = *other;
            return;
        }
        let (na, nb) = (self.count as f64, other.count as f64);
        let n = na + nb;
        let delta = other.mean - self.mean;
        self.mean += delta * nb / n;
        self.m2 += other.m2 + delta * delta * na * nb / n;
        self.count += other.count;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }
}

/// Same result as [`Moments`], computed with Welford updates and Chan's
/// parallel merge for better numeric fidelity. Non-finite inputs are
/// rejected the same way.
///
/// - Partial: [`WelfordState`]
/// - Output: [`Summary`]
#[derive(Clone, Copy, Debug, Default)]
pub struct StableMoments<V>(pub PhantomData<V>);
impl<V> StableMoments<V> {
    /// Convenience constructor (same as `Default`).
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<V> Aggregator<V, WelfordState, Summary> for StableMoments<V>
where
    V: AsPrimitive<f64> + Send + Sync,
{
    fn combine(&self, values: Vec<V>) -> Result<WelfordState> {
        if values.is_empty() {
            return Err(AggError::EmptyGroup);
        }
        let mut acc = WelfordState {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        };
        for v in values {
            acc.update(finite(v)?);
        }
        Ok(acc)
    }

    fn merge(&self, partials: Vec<WelfordState>) -> Result<WelfordState> {
        let mut it = partials.into_iter();
        let mut acc = it.next().ok_or(AggError::EmptyGroup)?;
        for s in it {
            acc.absorb(&s);
        }
        Ok(acc)
    }

    #[allow(clippy::cast_precision_loss)]
    fn finalize(&self, acc: WelfordState) -> Result<Summary> {
        if acc.count == 0 {
            return Err(AggError::EmptyGroup);
        }
        let stddev = if acc.count > 1 {
            (acc.m2 / (acc.count as f64 - 1.0)).max(0.0).sqrt()
        } else {
            0.0
        };
        Ok(Summary {
            count: acc.count,
            mean: acc.mean,
            stddev,
            min: acc.min,
            max: acc.max,
        })
    }
}
