//! Project layout for libstack.
//!
//! Every path the tool touches is derived from the project root. There is
//! no configuration file and nothing is read from the environment; the
//! value is built once in `main` and passed to each component.

use std::path::{Path, PathBuf};

/// Registry file name, relative to the project root.
pub const REGISTRY_FILE: &str = "libraries.yaml";

/// Prefix shared by runtime and build images.
pub const IMAGE_PREFIX: &str = "libstack";

/// Container engine binary.
pub const CONTAINER_ENGINE: &str = "docker";

/// Runtime id that matches every library.
pub const WILDCARD_RUNTIME: &str = "all";

/// Directory inside runtime images holding installed records.
pub const IMAGE_RECORDS_DIR: &str = "/opt/libstack/installed";

/// Project layout.
#[derive(Debug, Clone)]
pub struct Config {
    /// Library/runtime registry.
    pub registry_path: PathBuf,
    /// Downloaded source archives, one subdirectory per runtime.
    pub sources_dir: PathBuf,
    /// Build outputs, one subdirectory per runtime.
    pub build_dir: PathBuf,
    /// Build scripts (mounted read-only).
    pub scripts_dir: PathBuf,
    /// Shared utilities (mounted writable).
    pub utils_dir: PathBuf,
    /// Image introspection cache.
    pub image_cache_dir: PathBuf,
    /// Documentation file rewritten by `update-readme`.
    pub readme_path: PathBuf,
    /// Container engine program.
    pub engine: String,
}

impl Config {
    /// Derive the layout from a project root.
    pub fn new(base_dir: &Path) -> Self {
        Self {
            registry_path: base_dir.join(REGISTRY_FILE),
            sources_dir: base_dir.join("sources"),
            build_dir: base_dir.join("build"),
            scripts_dir: base_dir.join("scripts"),
            utils_dir: base_dir.join("utils"),
            image_cache_dir: base_dir.join(".cache/images"),
            readme_path: base_dir.join("README.md"),
            engine: CONTAINER_ENGINE.to_string(),
        }
    }

    /// Source directory for a runtime.
    pub fn source_dir(&self, runtime: &str) -> PathBuf {
        self.sources_dir.join(runtime)
    }

    /// Local path of a downloaded source archive.
    pub fn archive_path(&self, runtime: &str, filename: &str) -> PathBuf {
        self.source_dir(runtime).join(filename)
    }

    /// Build output directory for a runtime.
    pub fn runtime_build_dir(&self, runtime: &str) -> PathBuf {
        self.build_dir.join(runtime)
    }

    /// Installed record path for a library.
    pub fn record_path(&self, runtime: &str, id: &str) -> PathBuf {
        self.runtime_build_dir(runtime)
            .join("installed")
            .join(format!("{}.yaml", id))
    }

    /// Image name for a runtime (`libstack/runtime-<id>`).
    pub fn runtime_image(&self, runtime: &str) -> String {
        format!("{}/runtime-{}", IMAGE_PREFIX, runtime)
    }

    /// Image name for a build environment (`libstack/build-<id>`).
    pub fn build_image(&self, image: &str) -> String {
        format!("{}/build-{}", IMAGE_PREFIX, image)
    }

    /// Cache file for an image's introspection output.
    pub fn image_cache_path(&self, image_id: &str) -> PathBuf {
        // Image ids may carry an algorithm prefix ("sha256:...").
        let key = image_id.replace(':', "-");
        self.image_cache_dir.join(format!("{}.yaml", key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_path_is_runtime_scoped() {
        let config = Config::new(Path::new("/proj"));
        assert_eq!(
            config.record_path("gcc", "fmt"),
            PathBuf::from("/proj/build/gcc/installed/fmt.yaml")
        );
    }

    #[test]
    fn test_archive_path_under_runtime_sources() {
        let config = Config::new(Path::new("/proj"));
        assert_eq!(
            config.archive_path("python", "numpy-1.26.4.tar.gz"),
            PathBuf::from("/proj/sources/python/numpy-1.26.4.tar.gz")
        );
    }

    #[test]
    fn test_image_names() {
        let config = Config::new(Path::new("/proj"));
        assert_eq!(config.runtime_image("gcc"), "libstack/runtime-gcc");
        assert_eq!(config.build_image("gcc"), "libstack/build-gcc");
    }

    #[test]
    fn test_image_cache_path_strips_digest_prefix() {
        let config = Config::new(Path::new("/proj"));
        assert_eq!(
            config.image_cache_path("sha256:abc"),
            PathBuf::from("/proj/.cache/images/sha256-abc.yaml")
        );
    }
}
