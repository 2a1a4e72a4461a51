//! RSL build pipeline
//!
//! Drives the Aqsis toolchain for RenderMan Shading Language projects:
//! - Scene descriptor parsing (Display target, referenced shaders)
//! - Artifact freshness tracking (mtime-based rebuild set)
//! - External tool execution with stderr-authoritative failure detection
//! - Diagnostic extraction from compiler/renderer output
//! - Build orchestration with concurrent shader compiles and
//!   abort-on-any-failure semantics

pub mod cancel;
pub mod diagnostics;
pub mod error;
pub mod freshness;
pub mod images;
pub mod pipeline;
pub mod runner;
pub mod scene;

// Re-export main types
pub use cancel::CancellationToken;
pub use diagnostics::{
    extract_diagnostics, Diagnostic, DiagnosticCollection, ErrorPattern, Extraction, Position,
    Range, Severity,
};
pub use error::{BuildError, BuildResult};
pub use freshness::{rebuild_set, scan_compiled_artifacts, scan_shader_sources, ShaderSource};
pub use pipeline::{BuildOutcome, BuildPipeline, BuildStage, ScenePicker, ShaderFailure};
pub use runner::{ToolFailure, ToolInvocation};
pub use scene::SceneDescriptor;

// Re-export the resolved config the pipeline consumes
pub use rsl_config::ResolvedConfig;
