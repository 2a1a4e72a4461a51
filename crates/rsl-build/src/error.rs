/// Build pipeline error types
use std::path::PathBuf;
use thiserror::Error;

pub type BuildResult<T> = Result<T, BuildError>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("No output target: {path} has no Display directive")]
    MissingOutputTarget { path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No scene file found in {dir}")]
    SceneNotFound { dir: PathBuf },

    #[error("Multiple scene files found in {dir} and none was selected")]
    AmbiguousScene { dir: PathBuf },

    #[error("Build cancelled")]
    Cancelled,

    #[error("I/O error at {path}: {error}")]
    IoError {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            error,
        }
    }

    /// Create a source-unreadable error
    pub fn source_unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SourceUnreadable {
            path: path.into(),
            source,
        }
    }
}
