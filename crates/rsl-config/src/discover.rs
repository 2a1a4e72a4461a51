//! Aqsis installation discovery
//!
//! Finds an Aqsis installation when the config does not name one, and locates
//! the binary directory inside an installation by probing for the `aqsisrc`
//! marker file that ships next to the tools.

use crate::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Marker file that identifies the Aqsis binary directory
const BIN_MARKER: &str = "aqsisrc";

/// Well-known installation locations, checked in order
fn default_install_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if cfg!(target_os = "macos") {
        paths.push(PathBuf::from("/Applications/Aqsis.app"));
    }
    if cfg!(target_os = "windows") {
        paths.push(PathBuf::from("c:/Program Files (x86)/Aqsis"));
    }
    if cfg!(target_os = "linux") {
        paths.push(PathBuf::from("/usr/local/aqsis"));
        paths.push(PathBuf::from("/opt/aqsis"));
    }

    paths
}

/// Find an Aqsis installation at a well-known location
pub fn find_installation() -> Option<PathBuf> {
    default_install_paths().into_iter().find(|p| p.exists())
}

/// Locate the directory holding the Aqsis binaries inside an installation.
///
/// Aqsis layouts differ per platform (`bin/` at the root on Linux, nested
/// under `Contents/Resources` in the macOS bundle), so the directory is
/// found by searching for the `aqsisrc` marker rather than hardcoding.
pub fn find_bin_dir(install_root: &Path) -> ConfigResult<PathBuf> {
    for entry in WalkDir::new(install_root)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_file() && entry.file_name() == BIN_MARKER {
            if let Some(parent) = entry.path().parent() {
                return Ok(parent.to_path_buf());
            }
        }
    }

    Err(ConfigError::BinPathNotFound {
        root: install_root.to_path_buf(),
        marker: BIN_MARKER.to_string(),
    })
}
