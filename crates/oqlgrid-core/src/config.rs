//! Executor configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default result bound at which paged queries switch to two-phase execution.
pub const DEFAULT_TWO_PHASE_THRESHOLD: usize = 101;

/// Configuration for the paged executor chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Pages whose result bound reaches this value use key-then-fetch
    /// execution (the first page never does).
    pub two_phase_threshold: usize,

    /// Whether key-then-fetch execution is available at all.
    pub two_phase_enabled: bool,
}

impl ExecutorConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self {
            two_phase_threshold: DEFAULT_TWO_PHASE_THRESHOLD,
            two_phase_enabled: true,
        }
    }

    /// Load a configuration from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the two-phase threshold.
    pub fn with_two_phase_threshold(mut self, threshold: usize) -> Self {
        self.two_phase_threshold = threshold;
        self
    }

    /// Disable key-then-fetch execution.
    pub fn without_two_phase(mut self) -> Self {
        self.two_phase_enabled = false;
        self
    }

    /// Check the configuration for inconsistent values.
    pub fn validate(&self) -> Result<()> {
        if self.two_phase_threshold == 0 {
            return Err(Error::Config(
                "two_phase_threshold must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self::new()
    }
}
