//! modbound CLI tool.
//!
//! Usage:
//! ```bash
//! modbound check [OPTIONS] [PATH]
//! modbound modules [PATH]
//! modbound list-rules
//! modbound init [OPTIONS] [PATH]
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod settings_source;

/// Module boundary linter for directory-organized PHP/Laravel codebases
#[derive(Parser)]
#[command(name = "modbound")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to settings file
    #[arg(short, long, global = true, env = "MODBOUND_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check PHP files for cross-module imports and config reads
    Check {
        /// Path to analyze (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only run specific rules (comma-separated)
        #[arg(long)]
        rules: Option<String>,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// List the modules of the project governing PATH
    Modules {
        /// Any path inside the project (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// List available rules
    ListRules,

    /// Write module boundary settings into composer.json
    Init {
        /// Project directory holding composer.json
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Modules root, relative to the project directory
        #[arg(long, default_value = commands::init::DEFAULT_MODULES_PATH)]
        modules_path: String,

        /// Shared module name (can be specified multiple times)
        #[arg(long)]
        shared: Vec<String>,

        /// Overwrite existing module boundary keys
        #[arg(long)]
        force: bool,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-violation compact format.
    Compact,
    /// Rich diagnostics with source excerpts.
    Pretty,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            path,
            format,
            rules,
            exclude,
        } => {
            let source = settings_source::locate(&path, cli.config.as_deref());
            let failed = commands::check::run(&path, format, rules.as_deref(), &exclude, &source)?;
            if failed {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Modules { path } => {
            let source = settings_source::locate(&path, cli.config.as_deref());
            commands::modules::run(&path, &source)
        }
        Commands::ListRules => {
            commands::list_rules::run();
            Ok(())
        }
        Commands::Init {
            path,
            modules_path,
            shared,
            force,
        } => commands::init::run(&path, &modules_path, &shared, force),
    }
}
