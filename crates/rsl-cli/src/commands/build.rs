//! Build command - compile stale shaders and render a scene

use anyhow::{Context, Result};
use rsl_build::{
    BuildOutcome, BuildPipeline, Diagnostic, DiagnosticCollection, ScenePicker, Severity,
};
use rsl_config::ResolvedConfig;
use std::path::{Path, PathBuf};

/// Build command arguments
#[derive(Default)]
pub struct BuildArgs {
    /// Scene or shader source file (defaults to the project's single scene)
    pub file: Option<PathBuf>,
    /// Project directory (defaults to current directory)
    pub project_dir: Option<PathBuf>,
    /// JSON output
    pub json: bool,
    /// Quiet output (errors only)
    pub quiet: bool,
}

/// Run the build command
pub fn run(args: BuildArgs) -> Result<()> {
    let project_dir = args.project_dir.clone().unwrap_or_else(|| PathBuf::from("."));

    let config = rsl_config::ConfigLoader::new()
        .load_from_directory(&project_dir)
        .context("Failed to load configuration")?;

    let active_file = match args.file.clone() {
        Some(file) => file,
        None => default_scene(&project_dir)?,
    };

    let runtime = build_runtime()?;
    let mut diagnostics = DiagnosticCollection::new();
    let outcome = runtime.block_on(execute(
        &project_dir,
        &config,
        &active_file,
        &mut diagnostics,
    ));

    if args.json {
        println!("{}", outcome_json(&outcome));
    } else {
        print_outcome(&outcome, args.quiet);
    }

    match &outcome {
        BuildOutcome::Success { .. } => Ok(()),
        BuildOutcome::ShaderCompileFailure { failures } => {
            anyhow::bail!("{} shader(s) failed to compile", failures.len())
        }
        BuildOutcome::SceneCompileFailure { .. } => anyhow::bail!("scene failed to render"),
        BuildOutcome::Aborted { reason } => anyhow::bail!("build aborted: {}", reason),
    }
}

/// One build run; shared with watch mode
pub(crate) async fn execute(
    project_dir: &Path,
    config: &ResolvedConfig,
    active_file: &Path,
    diagnostics: &mut DiagnosticCollection,
) -> BuildOutcome {
    let pipeline = BuildPipeline::new(project_dir, config.clone());
    pipeline.run(active_file, &RefusePicker, diagnostics).await
}

/// Single-threaded runtime: the pipeline is cooperative, not parallel
pub(crate) fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create async runtime")
}

/// With no file argument, the project must contain exactly one scene
pub(crate) fn default_scene(project_dir: &Path) -> Result<PathBuf> {
    let mut scenes: Vec<PathBuf> = std::fs::read_dir(project_dir)
        .with_context(|| format!("Failed to read {}", project_dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().and_then(|s| s.to_str()) == Some("rib"))
        .collect();
    scenes.sort();

    match scenes.len() {
        0 => anyhow::bail!("No scene file found in {}", project_dir.display()),
        1 => Ok(scenes.remove(0)),
        _ => {
            let listing: Vec<String> = scenes.iter().map(|p| p.display().to_string()).collect();
            anyhow::bail!(
                "Multiple scene files found; name one explicitly:\n  {}",
                listing.join("\n  ")
            )
        }
    }
}

/// Batch front-end: ambiguity is an error, not a prompt
struct RefusePicker;

#[async_trait::async_trait]
impl ScenePicker for RefusePicker {
    async fn pick(&self, candidates: &[PathBuf]) -> Option<PathBuf> {
        eprintln!("Multiple scene files found; name one explicitly:");
        for candidate in candidates {
            eprintln!("  {}", candidate.display());
        }
        None
    }
}

/// Human-readable outcome report. Returns whether the build succeeded.
pub(crate) fn print_outcome(outcome: &BuildOutcome, quiet: bool) -> bool {
    match outcome {
        BuildOutcome::Success { image } => {
            if !quiet {
                println!("\n{}", "=".repeat(60));
                println!("Build succeeded");
                println!("{}", "=".repeat(60));
                println!("  Image: {}", image.display());
                println!("{}", "=".repeat(60));
            }
            true
        }
        BuildOutcome::ShaderCompileFailure { failures } => {
            for failure in failures {
                for diag in &failure.diagnostics {
                    eprintln!("{}", format_diagnostic(&failure.path, diag));
                }
            }
            false
        }
        BuildOutcome::SceneCompileFailure { diagnostics } => {
            for diag in diagnostics {
                eprintln!("scene: {}", diag.message);
            }
            false
        }
        BuildOutcome::Aborted { reason } => {
            eprintln!("error: {}", reason);
            false
        }
    }
}

/// Machine-readable outcome summary
pub(crate) fn outcome_json(outcome: &BuildOutcome) -> serde_json::Value {
    match outcome {
        BuildOutcome::Success { image } => serde_json::json!({
            "success": true,
            "image": image.display().to_string(),
        }),
        BuildOutcome::ShaderCompileFailure { failures } => serde_json::json!({
            "success": false,
            "stage": "shaders",
            "failed": failures.iter().map(|f| f.name.clone()).collect::<Vec<_>>(),
        }),
        BuildOutcome::SceneCompileFailure { .. } => serde_json::json!({
            "success": false,
            "stage": "scene",
        }),
        BuildOutcome::Aborted { reason } => serde_json::json!({
            "success": false,
            "stage": "aborted",
            "reason": reason.to_string(),
        }),
    }
}

/// Compiler-style "file:line:col: severity: message", 1-indexed for display
fn format_diagnostic(path: &Path, diag: &Diagnostic) -> String {
    let severity = match diag.severity {
        Severity::Error => "error",
        Severity::Information => "info",
    };
    format!(
        "{}:{}:{}: {}: {}",
        path.display(),
        diag.range.start.line + 1,
        diag.range.start.character + 1,
        severity,
        diag.message
    )
}
