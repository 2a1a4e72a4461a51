use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

/// RenderMan Shading Language build tool.
///
/// Drives the Aqsis toolchain for RSL projects: compiles stale shaders,
/// renders scene files, and surfaces compiler errors as source-anchored
/// diagnostics.
///
/// EXAMPLES:
///     rsl build scene.rib          Compile stale shaders and render
///     rsl build matte.sl           Build the scene next to a shader
///     rsl watch scene.rib          Rebuild on every change
///     rsl clean                    Remove compiled shader artifacts
///     rsl lsp                      Start the language server
///
/// ENVIRONMENT VARIABLES:
///     RSL_AQSIS_HOME    Override the Aqsis installation root
///     RSL_AQSIS_BIN     Override the Aqsis binary directory
///     RSL_JSON          Set to '1' for JSON output by default
///     RUST_LOG          Log filter (e.g. rsl_build=debug)
#[derive(Parser)]
#[command(name = "rsl")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile stale shaders and render a scene
    ///
    /// The file may be a scene (.rib) or a shader source (.sl); for a
    /// shader, the scene file next to it is built. With no file, the
    /// project directory is searched for a single scene.
    ///
    /// EXAMPLES:
    ///     rsl build scene.rib           Build a scene
    ///     rsl build --json scene.rib    Machine-readable summary
    #[command(visible_alias = "b")]
    Build {
        /// Scene or shader source file
        file: Option<PathBuf>,
        /// Project directory (defaults to the current directory)
        #[arg(long, short = 'C')]
        project_dir: Option<PathBuf>,
        /// JSON output
        #[arg(long, env = "RSL_JSON")]
        json: bool,
        /// Quiet output (errors only)
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Watch for changes and rebuild
    ///
    /// Re-runs the build whenever a shader source or scene file in the
    /// project changes, with debouncing.
    ///
    /// EXAMPLES:
    ///     rsl watch scene.rib             Watch and rebuild
    ///     rsl watch scene.rib --no-clear  Keep previous output visible
    #[command(visible_alias = "w")]
    Watch {
        /// Scene or shader source file
        file: Option<PathBuf>,
        /// Project directory (defaults to the current directory)
        #[arg(long, short = 'C')]
        project_dir: Option<PathBuf>,
        /// Don't clear the terminal before each rebuild
        #[arg(long)]
        no_clear: bool,
    },

    /// Remove compiled shader artifacts
    Clean {
        /// Project directory (defaults to the current directory)
        #[arg(long, short = 'C')]
        project_dir: Option<PathBuf>,
    },

    /// Start the language server (stdio)
    Lsp,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env().init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            file,
            project_dir,
            json,
            quiet,
        } => commands::build::run(commands::build::BuildArgs {
            file,
            project_dir,
            json,
            quiet,
        }),
        Commands::Watch {
            file,
            project_dir,
            no_clear,
        } => commands::watch::run(commands::watch::WatchArgs {
            file,
            project_dir,
            clear_screen: !no_clear,
        }),
        Commands::Clean { project_dir } => commands::clean::run(project_dir),
        Commands::Lsp => commands::lsp::run(),
    }
}
