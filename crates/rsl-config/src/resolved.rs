//! Fully-resolved configuration handed to the build pipeline
//!
//! All defaults applied, all paths concrete. The pipeline never consults the
//! layered config files directly.

use std::path::PathBuf;

/// Resolved configuration with every default applied
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub toolchain: ToolchainSettings,
    pub folders: FolderSettings,
    pub images: ImageSettings,
}

/// Where the Aqsis toolchain lives
#[derive(Debug, Clone, PartialEq)]
pub struct ToolchainSettings {
    /// Installation root, exported as AQSISHOME
    pub home: PathBuf,
    /// Directory containing aqsl and aqsis
    pub bin_dir: PathBuf,
}

/// Project-relative output folders
#[derive(Debug, Clone, PartialEq)]
pub struct FolderSettings {
    pub compiled_shaders: PathBuf,
    pub images: PathBuf,
}

impl Default for FolderSettings {
    fn default() -> Self {
        Self {
            compiled_shaders: PathBuf::from("compiled"),
            images: PathBuf::from("images"),
        }
    }
}

/// How to post-process rendered images
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSettings {
    /// Output format extension: png, jpeg, tiff, or bmp
    pub format: String,
    /// Archive an existing output instead of overwriting it
    pub keep_history: bool,
    /// Name outputs with a local timestamp
    pub timestamp: bool,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            format: "png".to_string(),
            keep_history: false,
            timestamp: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_defaults() {
        let folders = FolderSettings::default();
        assert_eq!(folders.compiled_shaders, PathBuf::from("compiled"));
        assert_eq!(folders.images, PathBuf::from("images"));
    }

    #[test]
    fn test_image_defaults() {
        let images = ImageSettings::default();
        assert_eq!(images.format, "png");
        assert!(!images.keep_history);
        assert!(!images.timestamp);
    }
}
