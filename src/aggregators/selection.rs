//! Bounded top-k / bottom-k selection

use crate::aggregator::Aggregator;
use crate::config::SelectionConfig;
use crate::error::{AggError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Which end of the ordering a [`Selection`] keeps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Order {
    /// Largest comparison keys first (top-k).
    #[default]
    MaxFirst,
    /// Smallest comparison keys first (bottom-k).
    MinFirst,
}

/// Partial state of a [`Selection`]: at most `k` values, best first.
///
/// The order of `items` is significant and must survive serialization.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Ranked<T> {
    items: Vec<T>,
}

impl<T> Ranked<T> {
    /// Number of retained values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` when nothing was retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Retained values, best first.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Consume into the ranked values.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

type KeyFn<T, C> = Arc<dyn Fn(&T) -> Option<C> + Send + Sync>;

/// The best **k** values per key under a comparison key and an [`Order`].
///
/// - Partial: [`Ranked<T>`] (at most `k` values, best first)
/// - Output: `Vec<T>` (best first)
///
/// `combine` ranks raw values and keeps the best `k`. `merge` performs a
/// k-way merge of already-ranked partials and truncates back to `k`, so
/// partials are never re-ranked as if their elements were independent raw
/// values. Values with equal keys keep their input order, and earlier
/// partials win ties during a merge. Groups smaller than `k` return every
/// value; results are never padded.
///
/// Partials arriving at `merge` that are out of order or hold more than `k`
/// values (e.g. decoded from damaged bytes) are ranked again first.
///
/// A comparison key that is missing (`None`) or not ordered against itself
/// (e.g. `NaN`) fails with [`AggError::InvalidComparison`].
pub struct Selection<T, C = T> {
    k: usize,
    order: Order,
    key: KeyFn<T, C>,
}

impl<T, C> Clone for Selection<T, C> {
    fn clone(&self) -> Self {
        Self {
            k: self.k,
            order: self.order,
            key: Arc::clone(&self.key),
        }
    }
}

impl<T, C> fmt::Debug for Selection<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("k", &self.k)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

fn check_k(k: usize) -> Result<usize> {
    if k == 0 {
        return Err(AggError::InvalidParameter(
            "selection bound k must be positive".into(),
        ));
    }
    Ok(k)
}

impl<T> Selection<T, T>
where
    T: Clone + PartialOrd + 'static,
{
    /// Select by the natural ordering of the values themselves.
    ///
    /// # Errors
    /// `InvalidParameter` when `k == 0`.
    pub fn new(k: usize, order: Order) -> Result<Self> {
        Ok(Self {
            k: check_k(k)?,
            order,
            key: Arc::new(|v: &T| Some(v.clone())),
        })
    }

    /// The `k` largest values.
    ///
    /// # Errors
    /// `InvalidParameter` when `k == 0`.
    pub fn top(k: usize) -> Result<Self> {
        Self::new(k, Order::MaxFirst)
    }

    /// The `k` smallest values.
    ///
    /// # Errors
    /// `InvalidParameter` when `k == 0`.
    pub fn bottom(k: usize) -> Result<Self> {
        Self::new(k, Order::MinFirst)
    }

    /// Build a natural-order selection from its configuration.
    ///
    /// # Errors
    /// `InvalidParameter` when the configured `k` is zero.
    pub fn from_config(cfg: &SelectionConfig) -> Result<Self> {
        Self::new(cfg.k, cfg.order)
    }
}

impl<T: 'static, C: 'static> Selection<T, C> {
    /// Select by a projected comparison key, e.g. `|s: &String| s.to_lowercase()`.
    ///
    /// # Errors
    /// `InvalidParameter` when `k == 0`.
    pub fn by_key<F>(k: usize, order: Order, key: F) -> Result<Self>
    where
        F: Fn(&T) -> C + Send + Sync + 'static,
    {
        Ok(Self {
            k: check_k(k)?,
            order,
            key: Arc::new(move |v: &T| Some(key(v))),
        })
    }

    /// Select by a projection that may be missing for some values.
    ///
    /// A value whose key is `None` fails the batch instead of being dropped.
    ///
    /// # Errors
    /// `InvalidParameter` when `k == 0`.
    pub fn by_optional_key<F>(k: usize, order: Order, key: F) -> Result<Self>
    where
        F: Fn(&T) -> Option<C> + Send + Sync + 'static,
    {
        Ok(Self {
            k: check_k(k)?,
            order,
            key: Arc::new(key),
        })
    }

    /// Maximum number of retained values.
    #[must_use]
    pub const fn k(&self) -> usize {
        self.k
    }

    /// Which end of the ordering is kept.
    #[must_use]
    pub const fn order(&self) -> Order {
        self.order
    }
}

impl<T, C: PartialOrd> Selection<T, C> {
    fn project(&self, v: &T) -> Result<C> {
        let key = (self.key)(v).ok_or_else(|| {
            AggError::InvalidComparison("comparison key is missing for a value".into())
        })?;
        if key.partial_cmp(&key).is_none() {
            return Err(AggError::InvalidComparison(
                "comparison key is not ordered against itself".into(),
            ));
        }
        Ok(key)
    }

    /// `Less` when `a` ranks ahead of `b`.
    fn rank(&self, a: &C, b: &C) -> Result<Ordering> {
        let ord = match self.order {
            Order::MaxFirst => b.partial_cmp(a),
            Order::MinFirst => a.partial_cmp(b),
        };
        ord.ok_or_else(|| AggError::InvalidComparison("comparison keys are not mutually ordered".into()))
    }

    /// Insert into a ranked buffer of at most `k`, after any equal keys.
    fn insert_ranked(&self, buf: &mut Vec<(C, T)>, key: C, v: T) -> Result<()> {
        if buf.len() == self.k
            && let Some((last, _)) = buf.last()
            && self.rank(&key, last)? != Ordering::Less
        {
            return Ok(());
        }

        let (mut lo, mut hi) = (0, buf.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.rank(&key, &buf[mid].0)? == Ordering::Less {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        buf.insert(lo, (key, v));
        buf.truncate(self.k);
        Ok(())
    }

    /// Take a partial's run as-is when it is ranked and within `k`;
    /// otherwise rank it again from scratch.
    fn ranked_run(&self, run: Vec<(C, T)>) -> Result<VecDeque<(C, T)>> {
        let mut in_order = run.len() <= self.k;
        let mut i = 1;
        while in_order && i < run.len() {
            in_order = self.rank(&run[i].0, &run[i - 1].0)? != Ordering::Less;
            i += 1;
        }
        if in_order {
            return Ok(run.into());
        }

        let mut buf = Vec::with_capacity(self.k.min(run.len()));
        for (key, v) in run {
            self.insert_ranked(&mut buf, key, v)?;
        }
        Ok(buf.into())
    }
}

impl<T, C> Aggregator<T, Ranked<T>, Vec<T>> for Selection<T, C>
where
    T: Send + Sync + 'static,
    C: PartialOrd + Send + Sync + 'static,
{
    fn combine(&self, values: Vec<T>) -> Result<Ranked<T>> {
        let mut buf: Vec<(C, T)> = Vec::with_capacity(self.k.min(values.len()));
        for v in values {
            let key = self.project(&v)?;
            self.insert_ranked(&mut buf, key, v)?;
        }
        Ok(Ranked {
            items: buf.into_iter().map(|(_, v)| v).collect(),
        })
    }

    fn merge(&self, partials: Vec<Ranked<T>>) -> Result<Ranked<T>> {
        let mut runs: Vec<VecDeque<(C, T)>> = partials
            .into_iter()
            .map(|run| {
                let keyed = run
                    .items
                    .into_iter()
                    .map(|v| Ok((self.project(&v)?, v)))
                    .collect::<Result<Vec<_>>>()?;
                self.ranked_run(keyed)
            })
            .collect::<Result<_>>()?;

        // k-way merge over the run heads; earlier runs win ties
        let mut out = Vec::with_capacity(self.k);
        while out.len() < self.k {
            let mut best: Option<usize> = None;
            for (i, run) in runs.iter().enumerate() {
                let Some((key, _)) = run.front() else { continue };
                match best.and_then(|b| runs[b].front()) {
                    Some((best_key, _)) => {
                        if self.rank(key, best_key)? == Ordering::Less {
                            best = Some(i);
                        }
                    }
                    None => best = Some(i),
                }
            }
            let Some(b) = best else { break };
            if let Some((_, v)) = runs[b].pop_front() {
                out.push(v);
            }
        }
        Ok(Ranked { items: out })
    }

    fn finalize(&self, acc: Ranked<T>) -> Result<Vec<T>> {
        Ok(acc.items)
    }
}
