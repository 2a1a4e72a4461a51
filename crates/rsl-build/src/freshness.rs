//! Artifact freshness tracking
//!
//! Decides which shader sources need recompiling by comparing source
//! modification times against compiled-artifact modification times. Both
//! sides are scanned fresh on every build; nothing is persisted between
//! invocations.

use crate::error::{BuildError, BuildResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// Shader source file extension
pub const SOURCE_EXT: &str = "sl";

/// Compiled shader artifact extension
pub const ARTIFACT_EXT: &str = "slx";

/// A shader source file found next to the scene
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    /// Base name, extension stripped; also the artifact's logical name
    pub name: String,
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Enumerate shader sources in the scene's directory.
///
/// Non-recursive by design: a scene references shaders that live beside it.
/// Sorted by name so the rebuild set is deterministic.
pub fn scan_shader_sources(scene_dir: &Path) -> BuildResult<Vec<ShaderSource>> {
    let mut sources = Vec::new();

    let entries = std::fs::read_dir(scene_dir).map_err(|e| BuildError::io(scene_dir, e))?;
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some(SOURCE_EXT) {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(t) => t,
            // Racing deletion: the file is gone, so there is nothing to build
            Err(_) => continue,
        };
        sources.push(ShaderSource {
            name: name.to_string(),
            path,
            modified,
        });
    }

    sources.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(sources)
}

/// Enumerate compiled artifacts, keyed by base name.
///
/// Recursive, and a missing directory yields an empty map rather than an
/// error: a fresh checkout simply has everything stale.
pub fn scan_compiled_artifacts(artifact_dir: &Path) -> HashMap<String, SystemTime> {
    let mut artifacts = HashMap::new();

    for entry in WalkDir::new(artifact_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some(ARTIFACT_EXT) {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if let Some(modified) = entry.metadata().ok().and_then(|m| m.modified().ok()) {
            artifacts.insert(name.to_string(), modified);
        }
    }

    artifacts
}

/// A source is stale when no artifact exists or the source is strictly newer.
/// Equal timestamps count as fresh.
pub fn is_stale(source_modified: SystemTime, artifact_modified: Option<SystemTime>) -> bool {
    match artifact_modified {
        None => true,
        Some(artifact) => source_modified > artifact,
    }
}

/// Filter sources down to the set needing recompilation
pub fn rebuild_set(
    sources: Vec<ShaderSource>,
    artifacts: &HashMap<String, SystemTime>,
) -> Vec<ShaderSource> {
    sources
        .into_iter()
        .filter(|s| is_stale(s.modified, artifacts.get(&s.name).copied()))
        .collect()
}
