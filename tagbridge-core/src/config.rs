//! Bridge configuration

use crate::arena::{DEFAULT_BLOCK_SIZE, MAX_BLOCK_SIZE};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration shared by the document builder and the batch scheduler
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Default arena block size in bytes
    pub arena_block_size: usize,
    /// Upper bound on batch worker threads (None = number of CPUs)
    pub max_threads: Option<usize>,
    /// Tokenizer options used by the tagging paths
    pub tokenizer_options: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            arena_block_size: DEFAULT_BLOCK_SIZE,
            max_threads: None,
            tokenizer_options: String::new(),
        }
    }
}

impl BridgeConfig {
    /// Create a builder
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }

    /// Parse a configuration from TOML; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: BridgeConfig =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML configuration file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.arena_block_size == 0 {
            return Err(Error::Config("arena_block_size must be > 0".to_string()));
        }
        if self.arena_block_size > MAX_BLOCK_SIZE {
            return Err(Error::Config(format!(
                "arena_block_size must be <= {MAX_BLOCK_SIZE}, got {}",
                self.arena_block_size
            )));
        }
        if self.max_threads == Some(0) {
            return Err(Error::Config("max_threads must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Builder for [`BridgeConfig`]
#[derive(Debug, Default)]
pub struct BridgeConfigBuilder {
    config: BridgeConfig,
}

impl BridgeConfigBuilder {
    /// Set the default arena block size
    pub fn arena_block_size(mut self, size: usize) -> Self {
        self.config.arena_block_size = size;
        self
    }

    /// Set the worker thread limit
    pub fn max_threads(mut self, threads: Option<usize>) -> Self {
        self.config.max_threads = threads;
        self
    }

    /// Set the tokenizer options
    pub fn tokenizer_options(mut self, options: impl Into<String>) -> Self {
        self.config.tokenizer_options = options.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<BridgeConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
