//! Build-state reconciliation.
//!
//! Converges a library's installed record with its declared version:
//!
//! ```text
//! ABSENT     --build ok-->            PRESENT(v)
//! PRESENT(v) --declared v, no build-> PRESENT(v)
//! PRESENT(v) --declared v', build ok-> PRESENT(v')
//! PRESENT(v) --declared v', build fails-> ABSENT
//! ```
//!
//! The record is written only after the build has exited successfully, and
//! removed when it fails, so it never names a version that did not build.

use std::time::Duration;

use crate::builder::{BuildExecutor, BuildReport, BuildRunner};
use crate::config::Config;
use crate::download::{Downloader, SourceFetcher};
use crate::error::{Error, Result};
use crate::record::InstalledRecord;
use crate::registry::Registry;

/// Result of one reconciliation.
#[derive(Debug)]
pub enum Outcome {
    /// The recorded version already matches; nothing ran.
    UpToDate { version: String },
    /// Built (or trivially succeeded) and the record now names `version`.
    Built {
        version: String,
        elapsed: Option<Duration>,
    },
    /// The build failed; any previous record was removed.
    Failed { reason: Error },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

pub struct Reconciler<'a, D: Downloader, R: BuildRunner> {
    registry: &'a Registry,
    config: &'a Config,
    fetcher: SourceFetcher<'a, D>,
    executor: BuildExecutor<'a, R>,
}

impl<'a, D: Downloader, R: BuildRunner> Reconciler<'a, D, R> {
    pub fn new(registry: &'a Registry, config: &'a Config, downloader: D, runner: R) -> Self {
        Self {
            registry,
            config,
            fetcher: SourceFetcher::new(config, downloader),
            executor: BuildExecutor::new(config, runner),
        }
    }

    /// Bring one library's installed state in line with the registry.
    ///
    /// Unknown ids and record write errors are returned as `Err`; build
    /// and download failures become [`Outcome::Failed`], even when the
    /// stale record cannot be removed.
    pub fn reconcile(&self, id: &str) -> Result<Outcome> {
        let lib = self.registry.lookup(id)?;

        let fetched = self.fetcher.ensure_source(lib);
        if fetched.is_failure() {
            tracing::warn!("source for '{}' unavailable", id);
        }

        let record_path = self.config.record_path(&lib.runtime, &lib.id);
        let existing = match InstalledRecord::read(&record_path) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("ignoring unreadable record: {}", e);
                None
            }
        };

        // Plain string equality; "2.0" and "2.00" are different versions.
        if let Some(record) = &existing {
            if record.version == lib.version {
                return Ok(Outcome::UpToDate {
                    version: record.version.clone(),
                });
            }
            tracing::info!(
                "'{}' installed at {}, declared {}",
                id,
                record.version,
                lib.version
            );
        }

        match self.executor.run_build(lib) {
            Ok(report) => {
                InstalledRecord::from_library(lib).write(&record_path)?;
                let elapsed = match report {
                    BuildReport::NoOp => None,
                    BuildReport::Built(elapsed) => Some(elapsed),
                };
                Ok(Outcome::Built {
                    version: lib.version.clone(),
                    elapsed,
                })
            }
            Err(reason) => {
                match InstalledRecord::remove(&record_path) {
                    Ok(true) => tracing::info!("removed stale record {}", record_path.display()),
                    Ok(false) => {}
                    Err(e) => tracing::warn!("could not remove stale record: {}", e),
                }
                Ok(Outcome::Failed { reason })
            }
        }
    }
}
