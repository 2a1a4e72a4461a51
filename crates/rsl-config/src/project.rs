//! Project Configuration (rsl.toml)
//!
//! Handles project-level configuration stored in `rsl.toml` at the project root.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project configuration from rsl.toml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Toolchain locations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolchain: Option<ToolchainConfig>,

    /// Output folder layout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folders: Option<FoldersConfig>,

    /// Rendered image handling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<ImagesConfig>,
}

/// Toolchain locations (Aqsis installation)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ToolchainConfig {
    /// Aqsis installation root, exported to the tools as AQSISHOME
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home: Option<PathBuf>,

    /// Directory containing the aqsl/aqsis binaries.
    /// Discovered by probing the installation for `aqsisrc` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Output folder layout, relative to the project root
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct FoldersConfig {
    /// Directory for compiled shader artifacts (default: "compiled")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiled_shaders: Option<PathBuf>,

    /// Directory for converted render output (default: "images")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<PathBuf>,
}

/// Rendered image handling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ImagesConfig {
    /// Output format: png, jpeg, tiff, or bmp (default: "png")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Keep previous renders instead of overwriting (default: false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_history: Option<bool>,

    /// Name outputs with a local timestamp (default: false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<bool>,
}

impl ProjectConfig {
    /// Load project configuration from a file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the project configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(folders) = &self.folders {
            if let Some(dir) = &folders.compiled_shaders {
                validate_relative("folders.compiled_shaders", dir)?;
            }
            if let Some(dir) = &folders.images {
                validate_relative("folders.images", dir)?;
            }
        }

        if let Some(images) = &self.images {
            if let Some(format) = &images.format {
                if !is_supported_format(format) {
                    return Err(ConfigError::InvalidValue {
                        field: "images.format".to_string(),
                        reason: format!(
                            "unsupported format '{}', expected png, jpeg, tiff, or bmp",
                            format
                        ),
                    });
                }
            }
        }

        Ok(())
    }

    /// Merge another project config into this one.
    /// Other config takes precedence for non-None values.
    pub fn merge(&mut self, other: &ProjectConfig) {
        if let Some(toolchain) = &other.toolchain {
            let base = self.toolchain.get_or_insert_with(Default::default);
            if toolchain.home.is_some() {
                base.home = toolchain.home.clone();
            }
            if toolchain.path.is_some() {
                base.path = toolchain.path.clone();
            }
        }
        if let Some(folders) = &other.folders {
            let base = self.folders.get_or_insert_with(Default::default);
            if folders.compiled_shaders.is_some() {
                base.compiled_shaders = folders.compiled_shaders.clone();
            }
            if folders.images.is_some() {
                base.images = folders.images.clone();
            }
        }
        if let Some(images) = &other.images {
            let base = self.images.get_or_insert_with(Default::default);
            if images.format.is_some() {
                base.format = images.format.clone();
            }
            if images.keep_history.is_some() {
                base.keep_history = images.keep_history;
            }
            if images.timestamp.is_some() {
                base.timestamp = images.timestamp;
            }
        }
    }
}

/// Folder settings must stay inside the project
fn validate_relative(field: &str, dir: &Path) -> ConfigResult<()> {
    if dir.is_absolute() {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("'{}' must be relative to the project root", dir.display()),
        });
    }
    Ok(())
}

/// Check if an image format is one the conversion stage can write
pub(crate) fn is_supported_format(format: &str) -> bool {
    matches!(format, "png" | "jpeg" | "tiff" | "bmp")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_project_config() {
        let toml = r#"
[toolchain]
home = "/opt/aqsis"
"#;

        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.toolchain.unwrap().home,
            Some(PathBuf::from("/opt/aqsis"))
        );
    }

    #[test]
    fn test_parse_full_project_config() {
        let toml = r#"
[toolchain]
home = "/opt/aqsis"
path = "/opt/aqsis/bin"

[folders]
compiled_shaders = "compiled"
images = "renders"

[images]
format = "png"
keep_history = true
timestamp = false
"#;

        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_ok());
        let folders = config.folders.unwrap();
        assert_eq!(folders.compiled_shaders, Some(PathBuf::from("compiled")));
        assert_eq!(folders.images, Some(PathBuf::from("renders")));
        let images = config.images.unwrap();
        assert_eq!(images.format.as_deref(), Some("png"));
        assert_eq!(images.keep_history, Some(true));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let toml = r#"
[toolchain]
binaries = "/opt/aqsis/bin"
"#;

        let result: Result<ProjectConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_absolute_folder_rejected() {
        let toml = r#"
[folders]
compiled_shaders = "/tmp/compiled"
"#;

        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unsupported_format_rejected() {
        let toml = r#"
[images]
format = "webp"
"#;

        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_overrides_scalar_fields() {
        let mut base: ProjectConfig = toml::from_str(
            r#"
[toolchain]
home = "/opt/aqsis"

[images]
format = "png"
keep_history = true
"#,
        )
        .unwrap();

        let overlay: ProjectConfig = toml::from_str(
            r#"
[images]
format = "tiff"
"#,
        )
        .unwrap();

        base.merge(&overlay);
        let images = base.images.unwrap();
        assert_eq!(images.format.as_deref(), Some("tiff"));
        // Untouched fields survive the merge
        assert_eq!(images.keep_history, Some(true));
        assert_eq!(
            base.toolchain.unwrap().home,
            Some(PathBuf::from("/opt/aqsis"))
        );
    }
}
