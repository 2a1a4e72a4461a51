//! Configuration loading and precedence
//!
//! Merges global config, project config, and `RSL_*` environment variables
//! (later overrides earlier), applies defaults, and resolves the toolchain
//! location into a [`ResolvedConfig`] the build pipeline can consume as-is.

use crate::discover;
use crate::global::GlobalConfig;
use crate::project::{is_supported_format, ProjectConfig};
use crate::resolved::{FolderSettings, ImageSettings, ResolvedConfig, ToolchainSettings};
use crate::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};

/// Project configuration file name
pub const PROJECT_FILE: &str = "rsl.toml";

/// Environment variable overriding the Aqsis installation root
pub const ENV_AQSIS_HOME: &str = "RSL_AQSIS_HOME";

/// Environment variable overriding the Aqsis binary directory
pub const ENV_AQSIS_BIN: &str = "RSL_AQSIS_BIN";

/// Loads and merges configuration layers
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Skip ~/.rsl/config.toml (used by tests and --no-global)
    skip_global: bool,
}

impl ConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip the global config layer
    pub fn without_global(mut self) -> Self {
        self.skip_global = true;
        self
    }

    /// Load configuration for the project rooted at `project_dir`.
    ///
    /// A missing global or project file is fine; everything else
    /// (unreadable file, bad TOML, failed validation) is an error.
    pub fn load_from_directory(&self, project_dir: &Path) -> ConfigResult<ResolvedConfig> {
        let mut merged = ProjectConfig::default();

        if !self.skip_global {
            match GlobalConfig::global_config_path() {
                Ok(path) => match GlobalConfig::load_from_file(&path) {
                    Ok(global) => merged.merge(&global.settings),
                    Err(ConfigError::NotFound(_)) => {}
                    Err(e) => return Err(e),
                },
                // No home directory: nothing global to load
                Err(ConfigError::HomeNotFound) => {}
                Err(e) => return Err(e),
            }
        }

        match ProjectConfig::load_from_file(&project_dir.join(PROJECT_FILE)) {
            Ok(project) => merged.merge(&project),
            Err(ConfigError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }

        apply_env_overrides(&mut merged);
        self.resolve(merged)
    }

    /// Apply defaults and resolve the toolchain location
    fn resolve(&self, config: ProjectConfig) -> ConfigResult<ResolvedConfig> {
        let toolchain = config.toolchain.unwrap_or_default();

        let home = match toolchain.home {
            Some(home) => home,
            None => discover::find_installation().ok_or(ConfigError::ToolchainNotFound)?,
        };

        let bin_dir = match toolchain.path {
            Some(path) => path,
            None => discover::find_bin_dir(&home)?,
        };

        let folder_defaults = FolderSettings::default();
        let folders = config.folders.unwrap_or_default();
        let folders = FolderSettings {
            compiled_shaders: folders
                .compiled_shaders
                .unwrap_or(folder_defaults.compiled_shaders),
            images: folders.images.unwrap_or(folder_defaults.images),
        };

        let image_defaults = ImageSettings::default();
        let images = config.images.unwrap_or_default();
        let format = images.format.unwrap_or(image_defaults.format);
        if !is_supported_format(&format) {
            return Err(ConfigError::InvalidValue {
                field: "images.format".to_string(),
                reason: format!("unsupported format '{}'", format),
            });
        }
        let images = ImageSettings {
            format,
            keep_history: images.keep_history.unwrap_or(image_defaults.keep_history),
            timestamp: images.timestamp.unwrap_or(image_defaults.timestamp),
        };

        Ok(ResolvedConfig {
            toolchain: ToolchainSettings { home, bin_dir },
            folders,
            images,
        })
    }
}

/// Environment variables override both config files
fn apply_env_overrides(config: &mut ProjectConfig) {
    let toolchain = config.toolchain.get_or_insert_with(Default::default);

    if let Some(home) = non_empty_env(ENV_AQSIS_HOME) {
        toolchain.home = Some(PathBuf::from(home));
    }
    if let Some(bin) = non_empty_env(ENV_AQSIS_BIN) {
        toolchain.path = Some(PathBuf::from(bin));
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn write_project_config(dir: &Path, content: &str) {
        fs::write(dir.join(PROJECT_FILE), content).unwrap();
    }

    /// Project layout with a fake Aqsis install inside it
    fn project_with_toolchain() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let bin = dir.path().join("aqsis").join("bin");
        fs::create_dir_all(&bin).unwrap();
        fs::write(bin.join("aqsisrc"), "").unwrap();
        (dir, bin)
    }

    fn clear_env() {
        std::env::remove_var(ENV_AQSIS_HOME);
        std::env::remove_var(ENV_AQSIS_BIN);
    }

    #[test]
    #[serial]
    fn test_load_resolves_bin_dir_from_home() {
        clear_env();
        let (dir, bin) = project_with_toolchain();
        write_project_config(
            dir.path(),
            &format!(
                "[toolchain]\nhome = \"{}\"\n",
                dir.path().join("aqsis").display()
            ),
        );

        let config = ConfigLoader::new()
            .without_global()
            .load_from_directory(dir.path())
            .unwrap();
        assert_eq!(config.toolchain.bin_dir, bin);
        assert_eq!(config.folders.compiled_shaders, PathBuf::from("compiled"));
        assert_eq!(config.images.format, "png");
    }

    #[test]
    #[serial]
    fn test_explicit_bin_path_wins_over_discovery() {
        clear_env();
        let (dir, _bin) = project_with_toolchain();
        let explicit = dir.path().join("elsewhere");
        write_project_config(
            dir.path(),
            &format!(
                "[toolchain]\nhome = \"{}\"\npath = \"{}\"\n",
                dir.path().join("aqsis").display(),
                explicit.display()
            ),
        );

        let config = ConfigLoader::new()
            .without_global()
            .load_from_directory(dir.path())
            .unwrap();
        assert_eq!(config.toolchain.bin_dir, explicit);
    }

    #[test]
    #[serial]
    fn test_env_overrides_project_file() {
        clear_env();
        let (dir, _bin) = project_with_toolchain();
        write_project_config(
            dir.path(),
            &format!(
                "[toolchain]\nhome = \"{}\"\n",
                dir.path().join("aqsis").display()
            ),
        );

        let env_bin = dir.path().join("env-bin");
        std::env::set_var(ENV_AQSIS_BIN, &env_bin);
        let config = ConfigLoader::new()
            .without_global()
            .load_from_directory(dir.path());
        std::env::remove_var(ENV_AQSIS_BIN);

        assert_eq!(config.unwrap().toolchain.bin_dir, env_bin);
    }

    #[test]
    #[serial]
    fn test_missing_project_file_falls_back_to_discovery_failure() {
        clear_env();
        let dir = TempDir::new().unwrap();

        let result = ConfigLoader::new()
            .without_global()
            .load_from_directory(dir.path());
        // No config, no env, no well-known install inside the sandbox
        assert!(result.is_err());
    }
}
