//! Configuration for aggregator instantiation and the local runner.
//!
//! Configurations are plain `serde` structs, so a job can load them from
//! JSON alongside the rest of its settings:
//!
//! ```
//! use ironfold::config::{RunnerConfig, SelectionConfig};
//! use ironfold::aggregators::Order;
//!
//! let sel = SelectionConfig::from_json_str(r#"{ "k": 3, "order": "min_first" }"#)?;
//! assert_eq!(sel.order, Order::MinFirst);
//!
//! let run = RunnerConfig::from_json_str(r#"{ "mode": "sequential", "fan_in": 4 }"#)?;
//! assert_eq!(run.fan_in, 4);
//! # Ok::<_, anyhow::Error>(())
//! ```

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fs::read_to_string;
use std::path::Path;

use crate::aggregators::Order;

fn parse_json<T: DeserializeOwned>(what: &str, s: &str) -> Result<T> {
    serde_json::from_str(s).with_context(|| format!("failed to parse {what} from JSON"))
}

fn read_json<T: DeserializeOwned>(what: &str, path: &Path) -> Result<T> {
    let text = read_to_string(path)
        .with_context(|| format!("failed to read {what} from {}", path.display()))?;
    parse_json(what, &text)
}

/* ===================== SelectionConfig ===================== */

/// Configuration of a natural-order top-k / bottom-k selection.
///
/// Comparison key functions are code, not data; use
/// [`Selection::by_key`](crate::aggregators::Selection::by_key) for those.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Number of values to keep; must be positive.
    pub k: usize,
    /// Which end of the ordering to keep (default `max_first`).
    #[serde(default)]
    pub order: Order,
}

impl SelectionConfig {
    /// Parse and validate.
    ///
    /// # Errors
    /// Malformed JSON or `k == 0`.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = parse_json("selection config", s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse, and validate a JSON file.
    ///
    /// # Errors
    /// I/O failure, malformed JSON, or `k == 0`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let cfg: Self = read_json("selection config", path.as_ref())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check parameter ranges.
    ///
    /// # Errors
    /// `k == 0`.
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            bail!("selection config: k must be positive");
        }
        Ok(())
    }
}

/* ===================== RunnerConfig ===================== */

/// Execution mode as written in configuration files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeConfig {
    Sequential,
    #[default]
    Parallel,
}

const fn default_fan_in() -> usize {
    2
}

/// Settings for [`Runner`](crate::Runner).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default)]
    pub mode: ModeConfig,
    /// Worker threads for parallel mode (`None` = rayon default).
    #[serde(default)]
    pub threads: Option<usize>,
    /// Input partitions for parallel mode (`None` = `2 * num_cpus`).
    #[serde(default)]
    pub partitions: Option<usize>,
    /// Maximum partials merged by one `merge` call.
    #[serde(default = "default_fan_in")]
    pub fan_in: usize,
    /// Round-trip partial states through the codec between combine and merge.
    #[serde(default)]
    pub encode_partials: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            mode: ModeConfig::default(),
            threads: None,
            partitions: None,
            fan_in: default_fan_in(),
            encode_partials: false,
        }
    }
}

impl RunnerConfig {
    /// Parse and validate.
    ///
    /// # Errors
    /// Malformed JSON or out-of-range settings.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = parse_json("runner config", s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse, and validate a JSON file.
    ///
    /// # Errors
    /// I/O failure, malformed JSON, or out-of-range settings.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let cfg: Self = read_json("runner config", path.as_ref())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check parameter ranges.
    ///
    /// # Errors
    /// `fan_in < 2`, or zero threads or partitions.
    pub fn validate(&self) -> Result<()> {
        if self.fan_in < 2 {
            bail!("runner config: fan_in must be at least 2, got {}", self.fan_in);
        }
        if self.threads == Some(0) {
            bail!("runner config: threads must be positive");
        }
        if self.partitions == Some(0) {
            bail!("runner config: partitions must be positive");
        }
        Ok(())
    }
}
