//! Clean command - remove compiled shader artifacts

use anyhow::{Context, Result};
use rsl_config::FolderSettings;
use std::path::PathBuf;

/// Run the clean command
pub fn run(project_dir: Option<PathBuf>) -> Result<()> {
    let project_dir = project_dir.unwrap_or_else(|| PathBuf::from("."));

    // The folder name comes from config when it loads; cleaning must work
    // even without a toolchain installed
    let compiled = match rsl_config::ConfigLoader::new().load_from_directory(&project_dir) {
        Ok(config) => project_dir.join(config.folders.compiled_shaders),
        Err(_) => project_dir.join(FolderSettings::default().compiled_shaders),
    };

    if !compiled.exists() {
        println!("Nothing to clean");
        return Ok(());
    }

    std::fs::remove_dir_all(&compiled)
        .with_context(|| format!("Failed to remove {}", compiled.display()))?;
    println!("Removed {}", compiled.display());

    Ok(())
}
