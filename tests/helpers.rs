//! Shared test utilities for libstack tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

use libstack::builder::{BuildJob, BuildRunner};
use libstack::config::Config;
use libstack::download::Downloader;
use libstack::images::{ContainerEngine, ImageMeta};
use libstack::registry::Registry;

/// Registry used by most tests.
pub const REGISTRY: &str = r#"
runtimes:
  - runtime: all
  - runtime: gcc
  - runtime: python
libraries:
  foo:
    lang: C++
    name: Foo
    version: '2.0'
    runtime: gcc
    source: https://example.com/dl/foo-2.0.tar.gz
    build-script: foo.sh
    homepage: https://example.com/foo
  headeronly:
    lang: C++
    name: Header Only
    version: '1.1'
    runtime: gcc
    source: https://example.com/dl/headeronly-1.1.zip
  numpy:
    lang: Python
    name: NumPy
    version: '1.26.4'
    runtime: python
    source: https://example.com/dl/numpy-1.26.4.tar.gz
    build-script: numpy.sh
  stdlib-only:
    lang: Python
    name: Bundled
    version: '3.12'
    runtime: python
"#;

/// Test environment rooted in a temporary project directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    pub base_dir: PathBuf,
    pub config: Config,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base_dir = temp_dir.path().to_path_buf();
        let config = Config::new(&base_dir);
        Self {
            _temp_dir: temp_dir,
            base_dir,
            config,
        }
    }

    /// Write `libraries.yaml` and load it.
    pub fn registry(&self, yaml: &str) -> Registry {
        fs::write(&self.config.registry_path, yaml).expect("Failed to write registry");
        Registry::load(&self.config.registry_path).expect("registry should load")
    }

    /// Place a source archive as if it had been downloaded earlier.
    pub fn place_source(&self, runtime: &str, filename: &str) -> PathBuf {
        let path = self.config.source_dir(runtime).join(filename);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"archive").unwrap();
        path
    }

    pub fn record_path(&self, runtime: &str, id: &str) -> PathBuf {
        self.config.record_path(runtime, id)
    }

    /// Write an installed record by hand.
    pub fn write_record(&self, runtime: &str, id: &str, version: &str) -> PathBuf {
        let path = self.record_path(runtime, id);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            format!(
                "ID: {id}\nNAME: {id}\nVERSION: '{version}'\nSOURCE: null\nHOMEPAGE: null\nLANG: C++\n"
            ),
        )
        .unwrap();
        path
    }
}

/// Downloader that records URLs and writes a placeholder archive.
#[derive(Clone, Default)]
pub struct RecordingDownloader {
    pub calls: Rc<RefCell<Vec<String>>>,
    pub fail: bool,
}

impl RecordingDownloader {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Downloader for RecordingDownloader {
    fn fetch_if_newer(&self, url: &str, dest_dir: &Path) -> bool {
        self.calls.borrow_mut().push(url.to_string());
        // wget names the file after the decoded last path segment.
        let name = urlencoding::decode(url.rsplit('/').next().unwrap())
            .unwrap()
            .into_owned();
        if self.fail {
            // Leave a truncated file behind like an interrupted transfer.
            fs::write(dest_dir.join(&name), b"partial").unwrap();
            return false;
        }
        fs::write(dest_dir.join(name), b"archive").unwrap();
        true
    }
}

/// Build runner that records jobs and exits with a fixed status.
#[derive(Clone, Default)]
pub struct FakeRunner {
    pub jobs: Rc<RefCell<Vec<BuildJob>>>,
    pub fail: bool,
}

impl FakeRunner {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.jobs.borrow().len()
    }
}

impl BuildRunner for FakeRunner {
    fn run(&self, job: &BuildJob) -> libstack::Result<()> {
        self.jobs.borrow_mut().push(job.clone());
        if self.fail {
            Err(libstack::Error::Build {
                id: job.id.clone(),
                detail: "exit code 1".into(),
            })
        } else {
            Ok(())
        }
    }
}

/// Container engine backed by in-memory images.
#[derive(Clone, Default)]
pub struct FakeEngine {
    pub images: HashMap<String, ImageMeta>,
    pub streams: HashMap<String, String>,
    pub introspections: Rc<RefCell<Vec<String>>>,
}

impl FakeEngine {
    pub fn with_image(mut self, repository: &str, id: &str, stream: &str) -> Self {
        self.images.insert(
            repository.to_string(),
            ImageMeta {
                repository: repository.to_string(),
                tag: "latest".into(),
                id: id.to_string(),
                created_at: "2024-05-01 10:00:00 +0000 UTC".into(),
                size: "1.2GB".into(),
            },
        );
        self.streams.insert(id.to_string(), stream.to_string());
        self
    }
}

impl ContainerEngine for FakeEngine {
    fn find_image(&self, name: &str) -> anyhow::Result<Option<ImageMeta>> {
        Ok(self.images.get(name).cloned())
    }

    fn introspect(&self, image_id: &str) -> anyhow::Result<String> {
        self.introspections.borrow_mut().push(image_id.to_string());
        self.streams
            .get(image_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no such image {}", image_id))
    }
}
