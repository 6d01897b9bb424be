//! Configuration System
//!
//! TOML host configuration for the engine defaults and logging. Loaded from
//! an explicit path when given, otherwise discovered at the platform config
//! directory (`scripthost/config.toml`); a missing file falls back to
//! defaults.

use crate::error::HostError;
use crate::logging::LoggingConfig;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfig {
    /// Engine defaults applied to newly constructed engines
    #[serde(default)]
    pub engine: EngineDefaults,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Engine-related settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineDefaults {
    /// Register the baseline library and built-in namespaces
    #[serde(default = "default_true")]
    pub default_imports: bool,

    /// Additional namespaces to import on top of the defaults
    #[serde(default)]
    pub imports: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Default for EngineDefaults {
    fn default() -> Self {
        Self {
            default_imports: default_true(),
            imports: Vec::new(),
        }
    }
}

impl HostConfig {
    /// Load from an explicit file, or from the discovered platform path, or
    /// fall back to defaults when no file exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self, HostError> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::discovered_path().filter(|p| p.exists()),
        };

        let config = match path {
            Some(path) => Self::load_from_file(&path)?,
            None => {
                debug!(target: "scripthost::config", "no config file found, using defaults");
                Self::default()
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and parse a specific TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, HostError> {
        let text = std::fs::read_to_string(path).map_err(|source| HostError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|err| HostError::ConfigParse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Platform config file location (`~/.config/scripthost/config.toml` on
    /// Linux). `None` when the home directory cannot be determined.
    pub fn discovered_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "scripthost")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Validate the whole configuration.
    pub fn validate(&self) -> Result<(), HostError> {
        self.logging
            .validate()
            .map_err(HostError::ConfigInvalid)?;
        for name in &self.engine.imports {
            if name.trim().is_empty() {
                return Err(HostError::ConfigInvalid(
                    "import names must not be blank".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = HostConfig::default();
        assert!(config.engine.default_imports);
        assert!(config.engine.imports.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_from_toml_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");

        std::fs::write(
            &config_file,
            r#"
[engine]
default_imports = false
imports = ["json"]

[logging]
level = "debug"
format = "json"
"#,
        )
        .unwrap();

        let config = HostConfig::load_from_file(&config_file).unwrap();
        assert!(!config.engine.default_imports);
        assert_eq!(config.engine.imports, vec!["json".to_string()]);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn load_with_explicit_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.toml");
        let err = HostConfig::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, HostError::ConfigRead { .. }));
    }

    #[test]
    fn parse_error_names_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "engine = 3").unwrap();

        let err = HostConfig::load_from_file(&config_file).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn validate_rejects_blank_import_names() {
        let mut config = HostConfig::default();
        config.engine.imports.push("  ".to_string());
        assert!(config.validate().is_err());
    }
}
