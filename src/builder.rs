//! Build execution.
//!
//! A library with a build script is compiled inside its build image. The
//! container sees a fixed layout:
//!
//! | Host                              | Container                 | Mode |
//! |-----------------------------------|---------------------------|------|
//! | `sources/<runtime>/<archive>`     | `/mnt/source/<archive>`   | ro   |
//! | `build/<runtime>/`                | `/mnt/build` (workdir)    | rw   |
//! | `utils/`                          | `/mnt/utils`              | rw   |
//! | `scripts/`                        | `/mnt/scripts`            | ro   |
//!
//! and runs `bash /mnt/scripts/<script>` as the invoking user, with `HOME`
//! pointed at `/mnt/build/.home`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::process::{self, Cmd};
use crate::registry::LibraryEntry;
use crate::timing::Timer;

const SOURCE_MOUNT: &str = "/mnt/source";
const BUILD_MOUNT: &str = "/mnt/build";
const UTILS_MOUNT: &str = "/mnt/utils";
const SCRIPTS_MOUNT: &str = "/mnt/scripts";
const HOME_DIR: &str = ".home";

/// Everything needed to run one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildJob {
    pub id: String,
    pub version: String,
    pub image: String,
    pub script: String,
    pub archive: PathBuf,
    pub build_dir: PathBuf,
    pub utils_dir: PathBuf,
    pub scripts_dir: PathBuf,
}

impl BuildJob {
    fn archive_name(&self) -> String {
        self.archive
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Path of the archive as seen from inside the container.
    pub fn container_source(&self) -> String {
        format!("{}/{}", SOURCE_MOUNT, self.archive_name())
    }

    /// Host directory used as the build's HOME.
    pub fn home_dir(&self) -> PathBuf {
        self.build_dir.join(HOME_DIR)
    }

    /// Arguments for `<engine> run`, given the `uid:gid` to run as.
    pub fn container_args(&self, user: &str) -> Vec<String> {
        let volume = |host: &Path, guest: &str, mode: Option<&str>| {
            let mut spec = format!("{}:{}", host.display(), guest);
            if let Some(mode) = mode {
                spec.push(':');
                spec.push_str(mode);
            }
            spec
        };
        let env = |key: &str, value: &str| format!("{}={}", key, value);

        vec![
            "run".into(),
            "--rm".into(),
            "--user".into(),
            user.into(),
            "--volume".into(),
            volume(&self.archive, &self.container_source(), Some("ro")),
            "--volume".into(),
            volume(&self.build_dir, BUILD_MOUNT, None),
            "--volume".into(),
            volume(&self.utils_dir, UTILS_MOUNT, None),
            "--volume".into(),
            volume(&self.scripts_dir, SCRIPTS_MOUNT, Some("ro")),
            "--workdir".into(),
            BUILD_MOUNT.into(),
            "--env".into(),
            env("VERSION", &self.version),
            "--env".into(),
            env("SOURCE", &self.container_source()),
            "--env".into(),
            env("LIB_ID", &self.id),
            "--env".into(),
            env("BUILD_DIR", BUILD_MOUNT),
            "--env".into(),
            env("UTILS_DIR", UTILS_MOUNT),
            "--env".into(),
            env("HOME", &format!("{}/{}", BUILD_MOUNT, HOME_DIR)),
            self.image.clone(),
            "bash".into(),
            format!("{}/{}", SCRIPTS_MOUNT, self.script),
        ]
    }
}

/// Runs a build job to completion.
pub trait BuildRunner {
    /// `Ok` only when the build exited with status zero.
    fn run(&self, job: &BuildJob) -> Result<()>;
}

/// Runs build jobs with a container engine.
#[derive(Debug, Clone)]
pub struct ContainerBuildRunner {
    engine: String,
}

impl ContainerBuildRunner {
    pub fn new(engine: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
        }
    }

    fn current_user() -> String {
        format!("{}:{}", nix::unistd::getuid(), nix::unistd::getgid())
    }
}

impl BuildRunner for ContainerBuildRunner {
    fn run(&self, job: &BuildJob) -> Result<()> {
        let failure = |detail: String| Error::Build {
            id: job.id.clone(),
            detail,
        };

        if !process::exists(&self.engine) {
            return Err(failure(format!("'{}' not found in PATH", self.engine)));
        }
        for dir in [job.home_dir(), job.utils_dir.clone()] {
            fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
        }

        let status = Cmd::new(&self.engine)
            .args(job.container_args(&Self::current_user()))
            .allow_fail()
            .run_interactive()
            .map_err(|e| failure(format!("{:#}", e)))?;

        if status.success() {
            Ok(())
        } else {
            Err(failure(format!("exit code {}", status.code().unwrap_or(-1))))
        }
    }
}

/// How a successful build attempt went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildReport {
    /// No build script; nothing to run.
    NoOp,
    /// The build ran and exited zero.
    Built(Duration),
}

pub struct BuildExecutor<'a, R: BuildRunner> {
    config: &'a Config,
    runner: R,
}

impl<'a, R: BuildRunner> BuildExecutor<'a, R> {
    pub fn new(config: &'a Config, runner: R) -> Self {
        Self { config, runner }
    }

    /// Resolve the job for a library, if it has a build script.
    pub fn job_for(&self, lib: &LibraryEntry) -> Option<BuildJob> {
        let script = lib.build_script.as_ref()?;
        let source = lib.source.as_ref()?;
        Some(BuildJob {
            id: lib.id.clone(),
            version: lib.version.clone(),
            image: self.config.build_image(lib.build_image()),
            script: script.clone(),
            archive: self.config.archive_path(&lib.runtime, &source.filename),
            build_dir: self.config.runtime_build_dir(&lib.runtime),
            utils_dir: self.config.utils_dir.clone(),
            scripts_dir: self.config.scripts_dir.clone(),
        })
    }

    /// Build a library. Libraries without a build script succeed trivially.
    pub fn run_build(&self, lib: &LibraryEntry) -> Result<BuildReport> {
        if lib.build_script.is_none() {
            return Ok(BuildReport::NoOp);
        }
        let job = self.job_for(lib).ok_or_else(|| {
            Error::Config(format!("library '{}' has a build-script but no source", lib.id))
        })?;
        if !job.archive.exists() {
            return Err(Error::Build {
                id: lib.id.clone(),
                detail: format!("source archive {} is missing", job.archive.display()),
            });
        }

        let timer = Timer::start(&format!("build {}", lib.id));
        self.runner.run(&job)?;
        Ok(BuildReport::Built(timer.finish()))
    }
}
