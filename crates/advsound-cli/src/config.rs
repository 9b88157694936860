//! Player configuration file.

use std::path::{Path, PathBuf};

use advsound_core::{ControllerConfig, Volume};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::BackendKind;

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub controller: ControllerConfig,
    pub backend: BackendKind,
    /// Volume applied to every sound before it starts.
    pub volume: Volume,
}

impl AppConfig {
    /// Default location of the configuration file, if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "advsound", "advsound")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Load `explicit`, or the default file if it exists, or the defaults.
    ///
    /// An explicit path must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.is_file() => path,
                _ => {
                    debug!("No configuration file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_json(&json)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.controller.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)] // Tests use unwrap for brevity

    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_json(r#"{ "backend": "hardware" }"#).unwrap();
        assert_eq!(config.backend, BackendKind::Hardware);
        assert_eq!(config.volume, Volume::MAX);
        assert_eq!(config.controller, ControllerConfig::default());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(AppConfig::from_json(r#"{ "volume": 140 }"#).is_err());
        assert!(AppConfig::from_json(r#"{ "controller": { "capacity": 0 } }"#).is_err());
        assert!(AppConfig::from_json(r#"{ "backend": "openal" }"#).is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "controller": {{ "capacity": 4 }}, "volume": 30 }}"#).unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.controller.capacity, 4);
        assert_eq!(config.volume.percent(), 30);
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load(Some(&dir.path().join("missing.json"))).is_err());
    }
}
