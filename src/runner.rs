//! In-process keyed executor.
//!
//! [`Runner`] plays the part of the execution environment for one keyed
//! aggregation: it splits records into partitions, combines each
//! `(partition, key)` group once, shuffles the partial states by key, merges
//! them as a tree of bounded fan-in, and finalizes every key exactly once.
//! Parallel mode runs partitions and keys on a rayon pool; both modes give
//! the same results because `merge` is associative and commutative.

use crate::aggregator::{AggBound, Aggregator};
use crate::aggregators::Passthrough;
use crate::codec::round_trip;
use crate::config::{ModeConfig, RunnerConfig};
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::{debug, trace, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecMode {
    Sequential,
    Parallel {
        threads: Option<usize>,
        partitions: Option<usize>,
    },
}

#[derive(Clone, Debug)]
pub struct Runner {
    pub mode: ExecMode,
    pub default_partitions: usize,
    /// Maximum partials per `merge` call.
    pub fan_in: usize,
    /// Round-trip partials through [`codec`](crate::codec) before merging.
    pub encode_partials: bool,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            mode: ExecMode::Parallel {
                threads: None,
                partitions: None,
            },
            default_partitions: 2 * num_cpus::get().max(2),
            fan_in: 2,
            encode_partials: false,
        }
    }
}

impl Runner {
    /// Single partition, single thread.
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            mode: ExecMode::Sequential,
            ..Default::default()
        }
    }

    /// Rayon-backed execution over `partitions` input partitions.
    #[must_use]
    pub fn parallel(partitions: usize) -> Self {
        Self {
            mode: ExecMode::Parallel {
                threads: None,
                partitions: Some(partitions),
            },
            ..Default::default()
        }
    }

    /// Build from validated configuration.
    ///
    /// # Errors
    /// Out-of-range settings (see [`RunnerConfig::validate`]).
    pub fn from_config(cfg: &RunnerConfig) -> Result<Self> {
        cfg.validate()?;
        let mode = match cfg.mode {
            ModeConfig::Sequential => ExecMode::Sequential,
            ModeConfig::Parallel => ExecMode::Parallel {
                threads: cfg.threads,
                partitions: cfg.partitions,
            },
        };
        Ok(Self {
            mode,
            fan_in: cfg.fan_in,
            encode_partials: cfg.encode_partials,
            ..Default::default()
        })
    }

    /// Aggregate `records` per key with `agg`.
    ///
    /// Returns one `(key, result)` per distinct key, sorted by key.
    ///
    /// # Errors
    /// The first aggregation error, with the failing key attached as context.
    /// The underlying [`AggError`](crate::AggError) is available through
    /// `downcast_ref`.
    pub fn run<K, V, P, O, A>(&self, agg: &A, records: Vec<(K, V)>) -> Result<Vec<(K, O)>>
    where
        K: Send + Sync + Clone + Eq + Hash + Ord + Debug,
        V: Send,
        P: Send + Serialize + DeserializeOwned,
        O: Send,
        A: Aggregator<V, P, O>,
    {
        match self.mode {
            ExecMode::Sequential => self.execute(agg, vec![records], false),
            ExecMode::Parallel {
                threads,
                partitions,
            } => {
                let parts = partitions
                    .unwrap_or(self.default_partitions)
                    .max(1)
                    .min(records.len().max(1));
                let chunks = split_vec(records, parts);
                match threads {
                    Some(t) => {
                        let pool = rayon::ThreadPoolBuilder::new()
                            .num_threads(t)
                            .build()
                            .context("failed to build rayon thread pool")?;
                        pool.install(|| self.execute(agg, chunks, true))
                    }
                    None => self.execute(agg, chunks, true),
                }
            }
        }
    }

    /// Identity stage: group and sort by key, re-emitting every value.
    ///
    /// Values keep their multiplicity; within a key they keep input order.
    ///
    /// # Errors
    /// Only codec failures when `encode_partials` is set.
    pub fn shuffle<K, V>(&self, records: Vec<(K, V)>) -> Result<Vec<(K, V)>>
    where
        K: Send + Sync + Clone + Eq + Hash + Ord + Debug,
        V: AggBound,
    {
        let grouped = self.run(&Passthrough::<V>::new(), records)?;
        Ok(grouped
            .into_iter()
            .flat_map(|(k, vs)| Passthrough::emit(&k, vs))
            .collect())
    }

    fn execute<K, V, P, O, A>(
        &self,
        agg: &A,
        partitions: Vec<Vec<(K, V)>>,
        parallel: bool,
    ) -> Result<Vec<(K, O)>>
    where
        K: Send + Sync + Clone + Eq + Hash + Ord + Debug,
        V: Send,
        P: Send + Serialize + DeserializeOwned,
        O: Send,
        A: Aggregator<V, P, O>,
    {
        debug!(partitions = partitions.len(), parallel, "combine stage");

        // Local: one combine per (partition, key)
        let combine_part = |(idx, part): (usize, Vec<(K, V)>)| -> Result<Vec<(K, P)>> {
            let mut groups: HashMap<K, Vec<V>> = HashMap::new();
            for (k, v) in part {
                groups.entry(k).or_default().push(v);
            }
            groups
                .into_iter()
                .map(|(k, vs)| {
                    let p = agg
                        .combine(vs)
                        .inspect_err(|e| warn!(key = ?k, partition = idx, error = %e, "combine failed"))
                        .with_context(|| format!("combine failed for key {k:?} in partition {idx}"))?;
                    let p = if self.encode_partials {
                        round_trip(&p)
                            .with_context(|| format!("partial state codec failed for key {k:?}"))?
                    } else {
                        p
                    };
                    Ok((k, p))
                })
                .collect()
        };
        let locals: Vec<Vec<(K, P)>> = if parallel {
            partitions
                .into_par_iter()
                .enumerate()
                .map(combine_part)
                .collect::<Result<_>>()?
        } else {
            partitions
                .into_iter()
                .enumerate()
                .map(combine_part)
                .collect::<Result<_>>()?
        };

        // Shuffle: partials per key, in partition order
        let mut shuffled: HashMap<K, Vec<P>> = HashMap::new();
        for local in locals {
            for (k, p) in local {
                shuffled.entry(k).or_default().push(p);
            }
        }
        let mut keyed: Vec<(K, Vec<P>)> = shuffled.into_iter().collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        debug!(keys = keyed.len(), fan_in = self.fan_in, "merge stage");

        // Global: merge tree, then exactly one finalize per key
        let reduce_key = |(k, partials): (K, Vec<P>)| -> Result<(K, O)> {
            let n = partials.len();
            let merged = agg
                .merge_tree(partials, self.fan_in)
                .inspect_err(|e| warn!(key = ?k, error = %e, "merge failed"))
                .with_context(|| format!("merge failed for key {k:?}"))?;
            let out = agg
                .finalize(merged)
                .inspect_err(|e| warn!(key = ?k, error = %e, "finalize failed"))
                .with_context(|| format!("finalize failed for key {k:?}"))?;
            trace!(key = ?k, partials = n, "finalized");
            Ok((k, out))
        };
        if parallel {
            keyed.into_par_iter().map(reduce_key).collect()
        } else {
            keyed.into_iter().map(reduce_key).collect()
        }
    }
}

fn split_vec<T>(v: Vec<T>, n: usize) -> Vec<Vec<T>> {
    let len = v.len();
    if n <= 1 || len <= 1 {
        return vec![v];
    }
    let chunk = len.div_ceil(n);
    let mut out = Vec::with_capacity(n);
    let mut it = v.into_iter().peekable();
    while it.peek().is_some() {
        out.push(it.by_ref().take(chunk).collect());
    }
    out
}
