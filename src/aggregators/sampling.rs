//! Bounded uniform sampling combiner

use crate::aggregator::Aggregator;
use crate::aggregators::selection::{Order, Ranked, Selection};
use crate::codec::encode_partial;
use crate::error::{AggError, Result};
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::fmt;

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// SplitMix64 output function.
const fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[derive(Clone, Copy, Debug)]
struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    #[inline]
    const fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(GOLDEN_GAMMA);
        mix64(self.state)
    }

    #[inline]
    #[allow(clippy::cast_precision_loss)]
    fn next_f64(&mut self) -> f64 {
        const SCALE: f64 = 1.0 / ((1u64 << 53) as f64);
        ((self.next_u64() >> 11) as f64) * SCALE
    }
}

/// Fold encoded bytes into one word, 8 bytes at a time.
fn fingerprint(bytes: &[u8]) -> u64 {
    bytes.chunks(8).fold(bytes.len() as u64, |h, chunk| {
        let mut word = [0u8; 8];
        word[..chunk.len()].copy_from_slice(chunk);
        mix64(h.wrapping_add(GOLDEN_GAMMA) ^ u64::from_le_bytes(word))
    })
}

/// Partial state of [`Reservoir`]: sampled values with their priorities,
/// highest priority first.
pub type Sample<T> = Ranked<(OrderedFloat<f64>, T)>;

/// Uniform sample of at most `capacity` records per key.
///
/// Every record gets its own priority in `[0, 1)` from a SplitMix64 stream,
/// and the sample keeps the `capacity` highest priorities. Duplicate values
/// are separate records with separate priorities. `merge` is a k-way merge
/// by priority, so it is associative and commutative.
///
/// Each `combine` batch draws from a stream seeded by `seed` and a
/// fingerprint of the batch's `postcard` encoding. The sample is therefore
/// reproducible for a fixed `seed` and a fixed partitioning of the input,
/// independent of the order in which batches are combined or merged, and of
/// the toolchain that built the node. Changing `seed` draws a different
/// sample.
///
/// - Partial: [`Sample<T>`]
/// - Output: `Vec<T>` in priority order
pub struct Reservoir<T> {
    capacity: usize,
    seed: u64,
    inner: Selection<(OrderedFloat<f64>, T), OrderedFloat<f64>>,
}

impl<T> Clone for Reservoir<T> {
    fn clone(&self) -> Self {
        Self {
            capacity: self.capacity,
            seed: self.seed,
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for Reservoir<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reservoir")
            .field("capacity", &self.capacity)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> Reservoir<T> {
    /// Sample at most `capacity` values, with priorities drawn from `seed`.
    ///
    /// # Errors
    /// `InvalidParameter` when `capacity == 0`.
    pub fn new(capacity: usize, seed: u64) -> Result<Self> {
        if capacity == 0 {
            return Err(AggError::InvalidParameter(
                "reservoir capacity must be positive".into(),
            ));
        }
        let inner = Selection::by_key(capacity, Order::MaxFirst, |e: &(OrderedFloat<f64>, T)| e.0)?;
        Ok(Self {
            capacity,
            seed,
            inner,
        })
    }

    /// Maximum number of sampled values.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> Aggregator<T, Sample<T>, Vec<T>> for Reservoir<T>
where
    T: Serialize + Send + Sync + 'static,
{
    fn combine(&self, values: Vec<T>) -> Result<Sample<T>> {
        let batch = fingerprint(&encode_partial(&values)?);
        let mut rng = SplitMix64::new(mix64(self.seed) ^ batch);
        let keyed = values
            .into_iter()
            .map(|v| (OrderedFloat(rng.next_f64()), v))
            .collect();
        self.inner.combine(keyed)
    }

    fn merge(&self, partials: Vec<Sample<T>>) -> Result<Sample<T>> {
        self.inner.merge(partials)
    }

    fn finalize(&self, acc: Sample<T>) -> Result<Vec<T>> {
        Ok(acc.into_vec().into_iter().map(|(_, v)| v).collect())
    }
}
