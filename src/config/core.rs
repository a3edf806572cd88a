use crate::Result;
use anyhow::Context;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

/// Repository-local config file picked up by [`ReduceConfig::load`]
pub const CONFIG_FILE: &str = "parallel-sum.toml";

/// Prefix for environment overrides, e.g. `PARALLEL_SUM_MAX_THREADS=4`
pub const ENV_PREFIX: &str = "PARALLEL_SUM_";

/// Worker sizing and strategy selection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReduceConfig {
    /// Maximum number of worker threads (0 = derive from CPU cores only)
    pub max_threads: usize,

    /// Percentage of CPU cores to use (1-100)
    pub thread_percentage: u8,

    /// Inputs shorter than this are summed sequentially
    pub min_items_for_parallel: usize,
}

impl Default for ReduceConfig {
    fn default() -> Self {
        Self {
            max_threads: 0,
            thread_percentage: 75,
            min_items_for_parallel: 10_000,
        }
    }
}

impl ReduceConfig {
    /// Load defaults, then `parallel-sum.toml`, then environment variables
    pub fn load() -> Result<Self> {
        Self::extract(Self::base().merge(Toml::file(CONFIG_FILE)))
    }

    /// Load defaults, then the given file, then environment variables.
    ///
    /// Unlike [`load`](Self::load), a missing file is an error here.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        Self::extract(Self::base().merge(Toml::file(path)))
            .with_context(|| format!("Failed to load config file: {}", path.display()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.thread_percentage) {
            anyhow::bail!(
                "thread_percentage must be between 1 and 100, got {}",
                self.thread_percentage
            );
        }

        Ok(())
    }

    /// Worker count for parallel runs on this machine.
    ///
    /// `thread_percentage` of the detected cores, never below one, then
    /// capped by `max_threads` unless that is 0.
    pub fn worker_budget(&self) -> usize {
        let cores = num_cpus::get();
        let share = (cores * usize::from(self.thread_percentage) / 100).max(1);

        match self.max_threads {
            0 => share,
            cap => share.min(cap),
        }
    }

    fn base() -> Figment {
        Figment::new().merge(Toml::string(DEFAULT_CONFIG))
    }

    fn extract(figment: Figment) -> Result<Self> {
        tracing::trace!("CONFIG LOAD: merging environment overrides");

        // Environment variables always have highest priority
        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .context("Failed to parse configuration")?;

        config.validate()?;

        tracing::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }
}
