//! Fetch-sources command - downloads upstream source archives.

use anyhow::Result;

use crate::config::Config;
use crate::download::{Downloader, FetchOutcome, SourceFetcher, Wget};
use crate::registry::{LibraryEntry, Registry};

/// Tally of a fetch-sources run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FetchSummary {
    pub fetched: usize,
    pub present: usize,
    pub failed: usize,
    pub no_source: usize,
}

/// Execute the fetch-sources command.
///
/// With a library id only that library is fetched; otherwise every
/// declared library, in id order.
pub fn cmd_fetch_sources(
    config: &Config,
    registry: &Registry,
    library: Option<&str>,
) -> Result<FetchSummary> {
    fetch_with(config, registry, library, Wget)
}

/// [`cmd_fetch_sources`] with an explicit downloader.
pub fn fetch_with<D: Downloader>(
    config: &Config,
    registry: &Registry,
    library: Option<&str>,
    downloader: D,
) -> Result<FetchSummary> {
    let libraries: Vec<&LibraryEntry> = match library {
        Some(id) => vec![registry.lookup(id)?],
        None => registry.libraries().collect(),
    };

    let fetcher = SourceFetcher::new(config, downloader);
    let mut summary = FetchSummary::default();
    for lib in libraries {
        match fetcher.ensure_source(lib) {
            FetchOutcome::NoSource => summary.no_source += 1,
            FetchOutcome::Present(path) => {
                summary.present += 1;
                println!("[SKIP] {} ({} exists)", lib.id, path.display());
            }
            FetchOutcome::Downloaded(path) => {
                summary.fetched += 1;
                println!("[OK] {} -> {}", lib.id, path.display());
            }
            FetchOutcome::Failed(e) => {
                summary.failed += 1;
                println!("[FAIL] {}: {}", lib.id, e);
            }
        }
    }

    if library.is_none() {
        println!(
            "\n{} fetched, {} already present, {} failed",
            summary.fetched, summary.present, summary.failed
        );
    }
    Ok(summary)
}
