//! Watch mode - automatic rebuild on file changes

use anyhow::{Context, Result};
use notify::{RecursiveMode, Watcher};
use rsl_build::DiagnosticCollection;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use super::build;

/// Debounce delay in milliseconds
const DEBOUNCE_MS: u64 = 300;

/// Watch command arguments
pub struct WatchArgs {
    /// Scene or shader source file
    pub file: Option<PathBuf>,
    /// Project directory (defaults to current directory)
    pub project_dir: Option<PathBuf>,
    /// Clear terminal before each rebuild
    pub clear_screen: bool,
}

/// Run the watch command
pub fn run(args: WatchArgs) -> Result<()> {
    let project_dir = args.project_dir.clone().unwrap_or_else(|| PathBuf::from("."));

    let config = rsl_config::ConfigLoader::new()
        .load_from_directory(&project_dir)
        .context("Failed to load configuration")?;

    let active_file = match args.file.clone() {
        Some(file) => file,
        None => build::default_scene(&project_dir)?,
    };
    if !active_file.exists() {
        anyhow::bail!("File not found: {}", active_file.display());
    }

    let watch_dir = active_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .to_path_buf();

    // Create channel for receiving file events
    let (tx, rx) = channel();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;
    watcher
        .watch(&watch_dir, RecursiveMode::NonRecursive)
        .context("Failed to start watching directory")?;

    println!("Watching {} for changes...", watch_dir.display());
    println!("Press Ctrl+C to stop\n");

    let runtime = build::build_runtime()?;
    // One collection across runs, so clear-on-success carries over
    let mut diagnostics = DiagnosticCollection::new();

    // Initial run
    run_once(
        &runtime,
        &project_dir,
        &config,
        &active_file,
        &mut diagnostics,
    );

    // Debounce state
    let mut last_run = Instant::now();
    let debounce_duration = Duration::from_millis(DEBOUNCE_MS);

    // Watch loop
    loop {
        match rx.recv() {
            Ok(Ok(event)) => {
                let should_rerun = event.paths.iter().any(|p| is_relevant_change(p));
                if !should_rerun {
                    log::debug!("ignoring change: {:?}", event.paths);
                    continue;
                }

                // Debounce: skip if we ran too recently
                let now = Instant::now();
                if now.duration_since(last_run) < debounce_duration {
                    continue;
                }
                last_run = now;

                if args.clear_screen {
                    clear_terminal();
                }

                run_once(
                    &runtime,
                    &project_dir,
                    &config,
                    &active_file,
                    &mut diagnostics,
                );
            }
            Ok(Err(e)) => {
                eprintln!("[watch] Error: {:?}", e);
            }
            Err(e) => {
                eprintln!("[watch] Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Only shader sources and scene files trigger a rebuild
fn is_relevant_change(changed_path: &Path) -> bool {
    matches!(
        changed_path.extension().and_then(|s| s.to_str()),
        Some("sl") | Some("rib")
    )
}

/// Run one build and display the outcome; watch mode never gives up
fn run_once(
    runtime: &tokio::runtime::Runtime,
    project_dir: &Path,
    config: &rsl_config::ResolvedConfig,
    active_file: &Path,
    diagnostics: &mut DiagnosticCollection,
) {
    let start = Instant::now();
    let outcome = runtime.block_on(build::execute(
        project_dir,
        config,
        active_file,
        diagnostics,
    ));

    if build::print_outcome(&outcome, false) {
        println!(
            "\n[watch] Completed in {:.2}s",
            start.elapsed().as_secs_f64()
        );
        println!("Watching for changes...");
    } else {
        println!();
        println!("Watching for changes... (fix errors and save)");
    }
}

/// Clear the terminal screen
fn clear_terminal() {
    // ANSI escape codes work on most terminals
    print!("\x1B[2J\x1B[1;1H");
    use std::io::Write;
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_relevant_change_shader() {
        assert!(is_relevant_change(Path::new("/test/matte.sl")));
    }

    #[test]
    fn test_is_relevant_change_scene() {
        assert!(is_relevant_change(Path::new("/test/scene.rib")));
    }

    #[test]
    fn test_is_relevant_change_other() {
        assert!(!is_relevant_change(Path::new("/test/readme.md")));
        assert!(!is_relevant_change(Path::new("/test/out.tif")));
    }
}
