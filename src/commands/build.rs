//! Build command - reconciles one library with the registry.

use anyhow::Result;

use crate::builder::{BuildRunner, ContainerBuildRunner};
use crate::config::Config;
use crate::download::{Downloader, Wget};
use crate::reconcile::{Outcome, Reconciler};
use crate::registry::Registry;
use crate::timing::format_duration;

/// Execute the build command.
///
/// Returns `false` when the requested build failed. With no library the
/// command does nothing: it never builds the whole registry implicitly.
pub fn cmd_build(config: &Config, registry: &Registry, library: Option<&str>) -> Result<bool> {
    build_with(
        config,
        registry,
        library,
        Wget,
        ContainerBuildRunner::new(&config.engine),
    )
}

/// [`cmd_build`] with explicit downloader and build runner.
pub fn build_with<D: Downloader, R: BuildRunner>(
    config: &Config,
    registry: &Registry,
    library: Option<&str>,
    downloader: D,
    runner: R,
) -> Result<bool> {
    let Some(id) = library else {
        println!("No library given; nothing to build. Usage: libstack build <library>");
        return Ok(true);
    };

    let reconciler = Reconciler::new(registry, config, downloader, runner);
    let outcome = reconciler.reconcile(id)?;
    print_outcome(id, &outcome);
    Ok(!outcome.is_failure())
}

fn print_outcome(id: &str, outcome: &Outcome) {
    match outcome {
        Outcome::UpToDate { version } => {
            println!("[SKIP] {} {} already installed", id, version);
        }
        Outcome::Built {
            version,
            elapsed: Some(elapsed),
        } => {
            println!("[OK] {} {} built in {}", id, version, format_duration(*elapsed));
        }
        Outcome::Built {
            version,
            elapsed: None,
        } => {
            println!("[OK] {} {} recorded (no build script)", id, version);
        }
        Outcome::Failed { reason } => {
            println!("[FAIL] {}: {}", id, reason);
        }
    }
}
