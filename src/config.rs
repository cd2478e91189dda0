//! Configuration for Strata
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a Strata instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files.
    /// Internal structure:
    ///   {data_dir}/
    ///     └── ranges/          (immutable sorted range files)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // Dedup Configuration
    // -------------------------------------------------------------------------
    /// Deadline for a single dedup transaction (milliseconds).
    /// The transaction aborts with a timeout error once exceeded.
    pub transaction_timeout_ms: u64,

    /// Max attempts for a dedup get-or-create that loses the insert race.
    /// Only unique-key conflicts are retried.
    pub dedup_retry_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./strata_data"),
            transaction_timeout_ms: 5000,
            dedup_retry_limit: 3,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Directory holding the immutable range files
    pub fn ranges_dir(&self) -> PathBuf {
        self.data_dir.join("ranges")
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the dedup transaction deadline (in milliseconds)
    pub fn transaction_timeout_ms(mut self, ms: u64) -> Self {
        self.config.transaction_timeout_ms = ms;
        self
    }

    /// Set the retry budget for dedup insert races
    pub fn dedup_retry_limit(mut self, limit: usize) -> Self {
        self.config.dedup_retry_limit = limit;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
