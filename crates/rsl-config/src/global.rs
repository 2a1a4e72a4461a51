//! Global Configuration (~/.rsl/config.toml)
//!
//! Handles user-level configuration stored in `~/.rsl/config.toml`. The file
//! carries the same sections as the project config; a machine-wide Aqsis
//! install is typically recorded here once instead of in every project.

use crate::project::ProjectConfig;
use crate::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};

/// Global user configuration from ~/.rsl/config.toml
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlobalConfig {
    /// Same layout as the project file
    pub settings: ProjectConfig,
}

impl GlobalConfig {
    /// Load global configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let settings = ProjectConfig::load_from_file(path)?;
        Ok(Self { settings })
    }

    /// Get the global config file path (~/.rsl/config.toml)
    pub fn global_config_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(".rsl").join("config.toml"))
    }
}
