//! Additive aggregators: `Sum`, `VectorSum`, `Count`

use crate::AggBound;
use crate::aggregator::Aggregator;
use crate::error::{AggError, Result};
use std::marker::PhantomData;
use std::mem::take;
use std::ops::Add;

/* ===================== Sum<T> ===================== */

/// Sum of values per key.
///
/// - Partial: `T` (running sum)
/// - Output: `T`
///
/// Requires `T: Add<Output=T> + Default`. The partial has the same type as
/// the input, so `Sum` can be used as its own combiner at any stage. An
/// empty batch yields `T::default()`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sum<T>(pub PhantomData<T>);
impl<T> Sum<T> {
    /// Convenience constructor (same as `Default`).
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Aggregator<T, T, T> for Sum<T>
where
    T: AggBound + Add<Output = T> + Default,
{
    fn combine(&self, values: Vec<T>) -> Result<T> {
        Ok(values.into_iter().fold(T::default(), |a, v| a + v))
    }

    fn merge(&self, partials: Vec<T>) -> Result<T> {
        self.combine(partials)
    }

    fn finalize(&self, acc: T) -> Result<T> {
        Ok(acc)
    }
}

/* ===================== VectorSum<T> ===================== */

/// Per-position sum of fixed-width tuples.
///
/// - Partial: `Vec<T>` (one running sum per position)
/// - Output: `Vec<T>`
///
/// Every tuple seen for a key must have the same length. With
/// [`VectorSum::with_arity`] the length is fixed up front, which also lets an
/// empty batch produce a zero tuple. Without it the first tuple sets the
/// length and an empty batch is an error.
#[derive(Clone, Copy, Debug, Default)]
pub struct VectorSum<T> {
    /// Expected tuple length, when known from a schema.
    pub arity: Option<usize>,
    _m: PhantomData<T>,
}

impl<T> VectorSum<T> {
    /// Vector sum whose arity is taken from the first tuple.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            arity: None,
            _m: PhantomData,
        }
    }

    /// Vector sum over tuples of exactly `arity` components.
    #[must_use]
    pub const fn with_arity(arity: usize) -> Self {
        Self {
            arity: Some(arity),
            _m: PhantomData,
        }
    }
}

impl<T> VectorSum<T>
where
    T: AggBound + Add<Output = T> + Default,
{
    fn sum_rows(&self, rows: Vec<Vec<T>>) -> Result<Vec<T>> {
        let mut rows = rows.into_iter();
        let Some(mut acc) = rows.next() else {
            return match self.arity {
                Some(n) => Ok(vec![T::default(); n]),
                None => Err(AggError::EmptyGroup),
            };
        };

        let expected = self.arity.unwrap_or(acc.len());
        if acc.len() != expected {
            return Err(AggError::ArityMismatch {
                expected,
                found: acc.len(),
            });
        }

        for row in rows {
            if row.len() != expected {
                return Err(AggError::ArityMismatch {
                    expected,
                    found: row.len(),
                });
            }
            for (a, v) in acc.iter_mut().zip(row) {
                *a = take(a) + v;
            }
        }
        Ok(acc)
    }
}

impl<T> Aggregator<Vec<T>, Vec<T>, Vec<T>> for VectorSum<T>
where
    T: AggBound + Add<Output = T> + Default,
{
    fn combine(&self, values: Vec<Vec<T>>) -> Result<Vec<T>> {
        self.sum_rows(values)
    }

    fn merge(&self, partials: Vec<Vec<T>>) -> Result<Vec<T>> {
        self.sum_rows(partials)
    }

    fn finalize(&self, acc: Vec<T>) -> Result<Vec<T>> {
        Ok(acc)
    }
}

/* ===================== Count ===================== */

/// Number of values per key, regardless of their content.
///
/// - Partial: `u64`
/// - Output: `u64`
#[derive(Clone, Copy, Debug, Default)]
pub struct Count;

impl<V: Send + 'static> Aggregator<V, u64, u64> for Count {
    fn combine(&self, values: Vec<V>) -> Result<u64> {
        Ok(values.len() as u64)
    }

    fn merge(&self, partials: Vec<u64>) -> Result<u64> {
        Ok(partials.into_iter().sum())
    }

    fn finalize(&self, acc: u64) -> Result<u64> {
        Ok(acc)
    }
}
