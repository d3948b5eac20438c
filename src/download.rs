//! Source fetching.
//!
//! Makes sure a library's upstream archive is present in its runtime's
//! source directory. Presence is judged by file name only; content is
//! never re-verified.

use std::fs;
use std::path::{Path, PathBuf};

use crate::common::remove_if_exists;
use crate::config::Config;
use crate::error::Error;
use crate::process::Cmd;
use crate::registry::LibraryEntry;

/// External downloader.
pub trait Downloader {
    /// Fetch `url` into `dest_dir`, only if the server copy is newer than
    /// any local one. Returns whether the downloader exited successfully.
    fn fetch_if_newer(&self, url: &str, dest_dir: &Path) -> bool;
}

/// `wget --timestamping`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Wget;

impl Downloader for Wget {
    fn fetch_if_newer(&self, url: &str, dest_dir: &Path) -> bool {
        let result = Cmd::new("wget")
            .args(["--timestamping", "--no-verbose", "--directory-prefix"])
            .arg_path(dest_dir)
            .arg(url)
            .allow_fail()
            .run_interactive();
        match result {
            Ok(status) => status.success(),
            Err(e) => {
                tracing::warn!("{:#}", e);
                false
            }
        }
    }
}

/// What [`SourceFetcher::ensure_source`] did.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The library declares no source.
    NoSource,
    /// A file by that name already existed; nothing was downloaded.
    Present(PathBuf),
    /// Freshly downloaded.
    Downloaded(PathBuf),
    /// The downloader failed; no file was left behind.
    Failed(Error),
}

impl FetchOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }
}

pub struct SourceFetcher<'a, D: Downloader> {
    config: &'a Config,
    downloader: D,
}

impl<'a, D: Downloader> SourceFetcher<'a, D> {
    pub fn new(config: &'a Config, downloader: D) -> Self {
        Self { config, downloader }
    }

    /// Ensure the library's source archive exists locally.
    pub fn ensure_source(&self, lib: &LibraryEntry) -> FetchOutcome {
        let Some(source) = &lib.source else {
            return FetchOutcome::NoSource;
        };
        let dest_dir = self.config.source_dir(&lib.runtime);
        let dest = self.config.archive_path(&lib.runtime, &source.filename);

        if dest.exists() {
            tracing::debug!("{} already present", dest.display());
            return FetchOutcome::Present(dest);
        }

        if let Err(e) = fs::create_dir_all(&dest_dir) {
            return FetchOutcome::Failed(Error::io(&dest_dir, e));
        }

        println!("Downloading {} ...", source.url);
        if self.downloader.fetch_if_newer(&source.url, &dest_dir) && dest.exists() {
            return FetchOutcome::Downloaded(dest);
        }

        // A failed download must not leave a file that later counts as present.
        if let Err(e) = remove_if_exists(&dest) {
            tracing::warn!("could not remove partial download: {}", e);
        }
        let error = Error::Download {
            url: source.url.clone(),
            detail: format!("downloader did not produce {}", dest.display()),
        };
        tracing::warn!("{}", error);
        FetchOutcome::Failed(error)
    }
}
