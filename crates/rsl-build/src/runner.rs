//! External tool execution
//!
//! Runs one toolchain binary with a controlled working directory and
//! environment overlay, capturing stdout and stderr. The Aqsis tools are
//! known to report errors on stderr while still exiting zero, so stderr
//! content is the authoritative failure signal: a run succeeds only when the
//! process exits cleanly AND stderr is empty.
//!
//! This module never interprets output content; mapping failure text to
//! diagnostics belongs to [`crate::diagnostics`].

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// One external tool invocation, built up then executed
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    env: Vec<(String, String)>,
}

/// Failure payload: the ordered non-empty stderr lines, or a single
/// process-level message when the tool could not be spawned at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolFailure {
    pub lines: Vec<String>,
}

impl ToolFailure {
    fn spawn_error(program: &Path, error: std::io::Error) -> Self {
        Self {
            lines: vec![format!("failed to start {}: {}", program.display(), error)],
        }
    }
}

impl std::fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lines.join("\n"))
    }
}

impl ToolInvocation {
    /// Start building an invocation of the given program
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set the working directory
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Add one environment variable on top of the inherited environment
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// The program being invoked
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run the tool to completion.
    ///
    /// Resolves to the ordered non-empty stdout lines on success. Non-empty
    /// stderr is a failure even with exit code 0.
    pub async fn run(&self) -> Result<Vec<String>, ToolFailure> {
        log::debug!(
            "running {} {}",
            self.program.display(),
            self.args.join(" ")
        );

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        let output = match cmd.output().await {
            Ok(output) => output,
            Err(e) => return Err(ToolFailure::spawn_error(&self.program, e)),
        };

        let stderr_lines = non_empty_lines(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() && stderr_lines.is_empty() {
            Ok(non_empty_lines(&String::from_utf8_lossy(&output.stdout)))
        } else {
            log::debug!(
                "{} failed ({}), {} stderr line(s)",
                self.program.display(),
                output.status,
                stderr_lines.len()
            );
            Err(ToolFailure {
                lines: stderr_lines,
            })
        }
    }
}

fn non_empty_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_success_returns_stdout_lines() {
        let result = ToolInvocation::new("sh")
            .arg("-c")
            .arg("printf 'one\\n\\ntwo\\n'")
            .run()
            .await
            .unwrap();
        assert_eq!(result, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_failure() {
        let result = ToolInvocation::new("sh")
            .arg("-c")
            .arg("echo broken >&2; exit 1")
            .run()
            .await;
        assert_eq!(result.unwrap_err().lines, vec!["broken"]);
    }

    #[tokio::test]
    async fn test_stderr_overrides_zero_exit() {
        let result = ToolInvocation::new("sh")
            .arg("-c")
            .arg("echo ok; echo warning >&2; exit 0")
            .run()
            .await;
        assert_eq!(result.unwrap_err().lines, vec!["warning"]);
    }

    #[tokio::test]
    async fn test_spawn_failure_is_single_message() {
        let result = ToolInvocation::new("/nonexistent/tool-binary").run().await;
        let failure = result.unwrap_err();
        assert_eq!(failure.lines.len(), 1);
        assert!(failure.lines[0].contains("failed to start"));
    }

    #[tokio::test]
    async fn test_env_overlay_and_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let result = ToolInvocation::new("sh")
            .arg("-c")
            .arg("echo \"$MARKER\"; pwd")
            .current_dir(dir.path())
            .env("MARKER", "overlay")
            .run()
            .await
            .unwrap();
        assert_eq!(result[0], "overlay");
        // Canonicalize: macOS tempdirs resolve through /private
        assert_eq!(
            std::fs::canonicalize(&result[1]).unwrap(),
            std::fs::canonicalize(dir.path()).unwrap()
        );
    }
}
