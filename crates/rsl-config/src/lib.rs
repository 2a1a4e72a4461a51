//! RSL Configuration System
//!
//! Provides configuration management for RSL projects including:
//! - Project configuration (rsl.toml)
//! - Global user configuration (~/.rsl/config.toml)
//! - Aqsis toolchain discovery
//! - Configuration precedence and merging
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Global config (~/.rsl/config.toml)
//! 2. Project config (./rsl.toml)
//! 3. Environment variables (RSL_*)
//!
//! # Example
//!
//! ```no_run
//! use rsl_config::ConfigLoader;
//! use std::path::Path;
//!
//! let loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("aqsl lives in {}", config.toolchain.bin_dir.display());
//! ```

pub mod discover;
pub mod global;
pub mod loader;
pub mod project;
pub mod resolved;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Aqsis installation not found; set toolchain.home in rsl.toml or RSL_AQSIS_HOME")]
    ToolchainNotFound,

    #[error("No directory containing '{marker}' under {root}")]
    BinPathNotFound { root: PathBuf, marker: String },

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use global::GlobalConfig;
pub use loader::ConfigLoader;
pub use project::ProjectConfig;
pub use resolved::{FolderSettings, ImageSettings, ResolvedConfig, ToolchainSettings};
