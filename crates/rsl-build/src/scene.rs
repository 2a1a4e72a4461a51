//! Scene descriptor parsing
//!
//! A RIB scene file is consumed at regex level only: the `Display` directive
//! names the output image, and `LightSource`/`Surface`/`Displacement`
//! directives reference shaders by name. Nothing else in the file matters to
//! the build.

use crate::error::{BuildError, BuildResult};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

fn display_rgx() -> &'static Regex {
    static RGX: OnceLock<Regex> = OnceLock::new();
    RGX.get_or_init(|| Regex::new(r#"Display\s+"(.+?)""#).unwrap())
}

fn shader_rgx() -> &'static Regex {
    static RGX: OnceLock<Regex> = OnceLock::new();
    RGX.get_or_init(|| Regex::new(r#"(?:LightSource|Surface|Displacement)\s+"(\w+?)""#).unwrap())
}

/// Everything the build needs to know about a scene file.
///
/// Immutable once constructed; built fresh for every build invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneDescriptor {
    /// Scene name (file stem)
    pub name: String,
    /// Path to the scene file
    pub path: PathBuf,
    /// Referenced shader names, in order of first appearance, duplicates kept
    pub shaders: Vec<String>,
    /// Output image file named by the Display directive
    pub out_image: String,
}

impl SceneDescriptor {
    /// Read and parse a scene file
    pub async fn load(path: &Path) -> BuildResult<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| BuildError::source_unreadable(path, e))?;
        Self::parse(path, &text)
    }

    /// Parse scene text.
    ///
    /// A scene without a Display directive cannot be built; a scene without
    /// shader references can.
    pub fn parse(path: &Path, text: &str) -> BuildResult<Self> {
        let out_image = display_rgx()
            .captures(text)
            .map(|c| c[1].to_string())
            .ok_or_else(|| BuildError::MissingOutputTarget {
                path: path.to_path_buf(),
            })?;

        let shaders = shader_rgx()
            .captures_iter(text)
            .map(|c| c[1].to_string())
            .collect();

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            name,
            path: path.to_path_buf(),
            shaders,
            out_image,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_display_and_shaders_in_order() {
        let text = r#"
Display "out.tif" "file" "rgba"
Projection "perspective" "fov" 45
Surface "a"
LightSource "ambientlight" "intensity" 0.2
Surface "b"
"#;
        let scene = SceneDescriptor::parse(Path::new("scene.rib"), text).unwrap();
        assert_eq!(scene.out_image, "out.tif");
        assert_eq!(scene.shaders, vec!["a", "ambientlight", "b"]);
        assert_eq!(scene.name, "scene");
    }

    #[test]
    fn test_parse_keeps_duplicate_shader_references() {
        let text = r#"
Display "x.tif"
Surface "matte"
Surface "matte"
"#;
        let scene = SceneDescriptor::parse(Path::new("s.rib"), text).unwrap();
        assert_eq!(scene.shaders, vec!["matte", "matte"]);
    }

    #[test]
    fn test_parse_no_shaders_is_valid() {
        let scene = SceneDescriptor::parse(Path::new("s.rib"), "Display \"out.tif\"\n").unwrap();
        assert!(scene.shaders.is_empty());
    }

    #[test]
    fn test_parse_missing_display_fails() {
        let result = SceneDescriptor::parse(Path::new("s.rib"), "Surface \"matte\"\n");
        assert!(matches!(
            result,
            Err(BuildError::MissingOutputTarget { .. })
        ));
    }

    #[test]
    fn test_parse_first_display_wins() {
        let text = "Display \"first.tif\"\nDisplay \"second.tif\"\n";
        let scene = SceneDescriptor::parse(Path::new("s.rib"), text).unwrap();
        assert_eq!(scene.out_image, "first.tif");
    }

    #[tokio::test]
    async fn test_load_missing_file_is_source_unreadable() {
        let result = SceneDescriptor::load(Path::new("/nonexistent/scene.rib")).await;
        assert!(matches!(result, Err(BuildError::SourceUnreadable { .. })));
    }
}
