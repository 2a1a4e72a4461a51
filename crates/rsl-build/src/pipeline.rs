//! Build orchestration
//!
//! Sequences one build run: resolve the scene file, compute the rebuild set,
//! compile stale shaders concurrently, render the scene, convert the output
//! image. Shader compiles are dispatched together and joined together; any
//! failure aborts the run before the scene is rendered, publishing each
//! failing shader's diagnostics independently. A run is one-shot; there is
//! no retry loop.

use crate::cancel::CancellationToken;
use crate::diagnostics::{extract_diagnostics, Diagnostic, DiagnosticCollection};
use crate::error::{BuildError, BuildResult};
use crate::freshness::{self, ShaderSource};
use crate::images;
use crate::runner::{ToolFailure, ToolInvocation};
use crate::scene::SceneDescriptor;

use futures_util::future::join_all;
use rsl_config::ResolvedConfig;
use std::path::{Path, PathBuf};

/// Shader compiler binary name
const COMPILER_BIN: &str = "aqsl";

/// Renderer binary name
const RENDERER_BIN: &str = "aqsis";

/// Environment variable naming the Aqsis installation root
const HOME_ENV: &str = "AQSISHOME";

/// Environment variable with the compiled-shader search path
const SHADER_PATH_ENV: &str = "AQSIS_SHADER_PATH";

/// Scene file extension
const SCENE_EXT: &str = "rib";

/// Orchestration stages, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    ResolvingScene,
    CheckingFreshness,
    CompilingShaders,
    CompilingScene,
    ConvertingImage,
}

impl std::fmt::Display for BuildStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ResolvingScene => "resolving scene",
            Self::CheckingFreshness => "checking freshness",
            Self::CompilingShaders => "compiling shaders",
            Self::CompilingScene => "compiling scene",
            Self::ConvertingImage => "converting image",
        };
        f.write_str(name)
    }
}

/// One failed shader compile with its published diagnostics
#[derive(Debug)]
pub struct ShaderFailure {
    pub name: String,
    pub path: PathBuf,
    pub diagnostics: Vec<Diagnostic>,
}

/// Terminal outcome of one build run
#[derive(Debug)]
pub enum BuildOutcome {
    /// Rendered and converted; the final image location
    Success { image: PathBuf },
    /// One or more shader compiles failed; the scene was never rendered
    ShaderCompileFailure { failures: Vec<ShaderFailure> },
    /// The renderer rejected the scene
    SceneCompileFailure { diagnostics: Vec<Diagnostic> },
    /// The run stopped before reaching the compile stage
    Aborted { reason: BuildError },
}

impl BuildOutcome {
    /// Whether the run produced an image
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Chooses among multiple candidate scene files. Returning `None` aborts
/// the build; interactive front-ends prompt, batch front-ends refuse.
#[async_trait::async_trait]
pub trait ScenePicker: Send + Sync {
    async fn pick(&self, candidates: &[PathBuf]) -> Option<PathBuf>;
}

/// Orchestrates one build at a time for a project
pub struct BuildPipeline {
    project_root: PathBuf,
    config: ResolvedConfig,
    cancel: CancellationToken,
}

impl BuildPipeline {
    /// Create a pipeline for the project rooted at the given path
    pub fn new(project_root: impl Into<PathBuf>, config: ResolvedConfig) -> Self {
        Self {
            project_root: project_root.into(),
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally-owned cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run one build for the given active file (a scene or a shader source).
    ///
    /// Diagnostics for failing files are published into `diagnostics`;
    /// entries for files whose rebuild succeeded are cleared.
    pub async fn run(
        &self,
        active_file: &Path,
        picker: &dyn ScenePicker,
        diagnostics: &mut DiagnosticCollection,
    ) -> BuildOutcome {
        match self.run_inner(active_file, picker, diagnostics).await {
            Ok(outcome) => outcome,
            Err(reason) => {
                log::warn!("build aborted: {}", reason);
                BuildOutcome::Aborted { reason }
            }
        }
    }

    async fn run_inner(
        &self,
        active_file: &Path,
        picker: &dyn ScenePicker,
        diagnostics: &mut DiagnosticCollection,
    ) -> BuildResult<BuildOutcome> {
        self.checkpoint()?;
        log::info!("{}", BuildStage::ResolvingScene);
        let scene_path = self.resolve_scene(active_file, picker).await?;
        let scene = SceneDescriptor::load(&scene_path).await?;
        let scene_dir = scene_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        self.checkpoint()?;
        log::info!("{}", BuildStage::CheckingFreshness);
        let sources = freshness::scan_shader_sources(&scene_dir)?;
        let total_sources = sources.len();
        let artifacts_dir = self.project_root.join(&self.config.folders.compiled_shaders);
        let artifacts = freshness::scan_compiled_artifacts(&artifacts_dir);
        let stale = freshness::rebuild_set(sources, &artifacts);
        log::info!(
            "scene {}: {} shader source(s), {} stale",
            scene.name,
            total_sources,
            stale.len()
        );

        self.checkpoint()?;
        log::info!("{}", BuildStage::CompilingShaders);
        if !stale.is_empty() {
            std::fs::create_dir_all(&artifacts_dir)
                .map_err(|e| BuildError::io(&artifacts_dir, e))?;
        }

        let compiles = stale
            .iter()
            .map(|shader| self.compile_shader(shader, &artifacts_dir));
        let results = join_all(compiles).await;

        let failed: Vec<(&ShaderSource, ToolFailure)> = stale
            .iter()
            .zip(results)
            .filter_map(|(shader, result)| result.err().map(|failure| (shader, failure)))
            .collect();

        if !failed.is_empty() {
            let failures = self
                .publish_shader_failures(failed, &artifacts_dir, diagnostics)
                .await;
            return Ok(BuildOutcome::ShaderCompileFailure { failures });
        }

        // The whole attempted set compiled; drop stale diagnostics for all of it
        for shader in &stale {
            diagnostics.clear(&shader.path);
        }

        self.checkpoint()?;
        log::info!("{}", BuildStage::CompilingScene);
        if let Err(failure) = self.render_scene(&scene, &scene_dir, &artifacts_dir).await {
            let published = self
                .publish_failure(&scene.path, &failure.lines, diagnostics)
                .await;
            return Ok(BuildOutcome::SceneCompileFailure {
                diagnostics: published,
            });
        }
        diagnostics.clear(&scene.path);

        self.checkpoint()?;
        log::info!("{}", BuildStage::ConvertingImage);
        let raw_image = scene_dir.join(&scene.out_image);
        let images_dir = self.project_root.join(&self.config.folders.images);
        let image = match images::convert_rendered_image(&raw_image, &images_dir, &self.config.images)
        {
            Ok(converted) => converted,
            Err(e) => {
                // Rendering already succeeded; degrade to done with a warning
                log::warn!("image conversion failed: {}", e);
                raw_image
            }
        };

        Ok(BuildOutcome::Success { image })
    }

    /// Locate the scene file for the active document.
    ///
    /// A scene file is used as-is. For a shader source (or anything else),
    /// sibling scene files are searched: exactly one wins, several defer to
    /// the picker, zero aborts.
    async fn resolve_scene(
        &self,
        active_file: &Path,
        picker: &dyn ScenePicker,
    ) -> BuildResult<PathBuf> {
        if active_file.extension().and_then(|s| s.to_str()) == Some(SCENE_EXT) {
            return Ok(active_file.to_path_buf());
        }

        let dir = active_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut candidates: Vec<PathBuf> = std::fs::read_dir(&dir)
            .map_err(|e| BuildError::io(&dir, e))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.is_file() && p.extension().and_then(|s| s.to_str()) == Some(SCENE_EXT)
            })
            .collect();
        candidates.sort();

        match candidates.len() {
            0 => Err(BuildError::SceneNotFound { dir }),
            1 => Ok(candidates.remove(0)),
            _ => picker
                .pick(&candidates)
                .await
                .ok_or(BuildError::AmbiguousScene { dir }),
        }
    }

    /// One shader compile: `aqsl -o <artifact> <source>`
    async fn compile_shader(
        &self,
        shader: &ShaderSource,
        artifacts_dir: &Path,
    ) -> Result<Vec<String>, ToolFailure> {
        let artifact = artifacts_dir.join(format!("{}.{}", shader.name, freshness::ARTIFACT_EXT));
        self.tool(COMPILER_BIN, &self.project_root, artifacts_dir)
            .arg("-o")
            .arg(artifact.display().to_string())
            .arg(shader.path.display().to_string())
            .run()
            .await
    }

    /// Render the scene: `aqsis <scene>` from the scene's directory, so the
    /// Display output lands next to the scene
    async fn render_scene(
        &self,
        scene: &SceneDescriptor,
        scene_dir: &Path,
        artifacts_dir: &Path,
    ) -> Result<Vec<String>, ToolFailure> {
        let file_name = scene
            .path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| scene.path.display().to_string());
        self.tool(RENDERER_BIN, scene_dir, artifacts_dir)
            .arg(file_name)
            .run()
            .await
    }

    /// Common invocation shape for both Aqsis tools
    fn tool(&self, binary: &str, cwd: &Path, artifacts_dir: &Path) -> ToolInvocation {
        ToolInvocation::new(self.config.toolchain.bin_dir.join(binary))
            .current_dir(cwd)
            .env(HOME_ENV, self.config.toolchain.home.display().to_string())
            .env(
                SHADER_PATH_ENV,
                format!("{}/:&", artifacts_dir.display()),
            )
    }

    /// Failure handling for the compile batch: drop each failed shader's
    /// stale artifact, then compute and publish its diagnostics
    async fn publish_shader_failures(
        &self,
        failed: Vec<(&ShaderSource, ToolFailure)>,
        artifacts_dir: &Path,
        diagnostics: &mut DiagnosticCollection,
    ) -> Vec<ShaderFailure> {
        let mut failures = Vec::new();

        for (shader, failure) in failed {
            let artifact =
                artifacts_dir.join(format!("{}.{}", shader.name, freshness::ARTIFACT_EXT));
            match std::fs::remove_file(&artifact) {
                Ok(()) => log::debug!("removed stale artifact {}", artifact.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => log::warn!("could not remove {}: {}", artifact.display(), e),
            }

            let published = self
                .publish_failure(&shader.path, &failure.lines, diagnostics)
                .await;
            failures.push(ShaderFailure {
                name: shader.name.clone(),
                path: shader.path.clone(),
                diagnostics: published,
            });
        }

        failures
    }

    /// Extract diagnostics for one anchor file and publish them.
    ///
    /// A batch that was recognized but produced no diagnostics leaves the
    /// file's previous entry untouched; a fully-unrecognized batch publishes
    /// the generic fallback.
    async fn publish_failure(
        &self,
        anchor: &Path,
        failure_lines: &[String],
        diagnostics: &mut DiagnosticCollection,
    ) -> Vec<Diagnostic> {
        let source = tokio::fs::read_to_string(anchor).await.unwrap_or_else(|e| {
            log::warn!("could not re-read {}: {}", anchor.display(), e);
            String::new()
        });

        let extraction = extract_diagnostics(&source, failure_lines);
        match extraction.into_published() {
            Some(published) => {
                diagnostics.set(anchor.to_path_buf(), published.clone());
                published
            }
            None => Vec::new(),
        }
    }

    fn checkpoint(&self) -> BuildResult<()> {
        if self.cancel.is_cancelled() {
            Err(BuildError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display_names() {
        assert_eq!(BuildStage::ResolvingScene.to_string(), "resolving scene");
        assert_eq!(BuildStage::ConvertingImage.to_string(), "converting image");
    }
}
