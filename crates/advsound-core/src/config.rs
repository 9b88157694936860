//! Controller configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Number of sound handles available when no capacity is configured.
pub const DEFAULT_CAPACITY: usize = 128;

/// Configuration for a sound controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ControllerConfig {
    /// Maximum number of concurrently live sound handles.
    pub capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl ControllerConfig {
    pub const fn with_capacity(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Parse a JSON configuration and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check that the configured id space is usable.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::Config("capacity must be at least 1".to_string()));
        }
        if u32::try_from(self.capacity).is_err() {
            return Err(Error::Config(format!(
                "capacity {} does not fit a sound id",
                self.capacity
            )));
        }
        Ok(())
    }
}
