//! libstack - builds third-party libraries into runtime images.
//!
//! Reads `libraries.yaml`, fetches upstream sources, runs per-library
//! build scripts inside containers and reports what each runtime image
//! has installed.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use libstack::commands;
use libstack::config::Config;
use libstack::registry::Registry;

#[derive(Parser)]
#[command(name = "libstack")]
#[command(about = "Third-party library builder for runtime images")]
#[command(
    after_help = "QUICK START:\n  libstack list                 Show declared libraries\n  libstack fetch-sources        Download all source archives\n  libstack build <library>      Build one library\n  libstack list-images          Compare images against the registry"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List declared libraries
    List,

    /// Regenerate the library table in README.md
    UpdateReadme,

    /// Show runtime images and the library versions installed in them
    ListImages,

    /// Build a library if its installed version differs from the registry
    Build {
        /// Library id (nothing is built without one)
        library: Option<String>,
    },

    /// Download source archives (all libraries when none is given)
    FetchSources {
        /// Library id
        library: Option<String>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<bool> {
    let base_dir = std::env::current_dir().context("Failed to determine working directory")?;
    let config = Config::new(&base_dir);
    let registry = Registry::load(&config.registry_path)?;

    match cli.command {
        Commands::List => commands::cmd_list(&registry)?,
        Commands::UpdateReadme => {
            commands::cmd_update_readme(&config, &registry)?;
        }
        Commands::ListImages => commands::cmd_list_images(&config, &registry)?,
        Commands::Build { library } => {
            return commands::cmd_build(&config, &registry, library.as_deref());
        }
        Commands::FetchSources { library } => {
            commands::cmd_fetch_sources(&config, &registry, library.as_deref())?;
        }
    }
    Ok(true)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing();

    if run(cli)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
